use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use attendance_tool::report::render_subject_report;
use attendance_tool::{
    AcademicSession, AttendanceRecord, Exam, HolidayImport, ProjectionConfig, Projector,
    SessionBook, SessionBounds, SubjectPolicy, load_attendance_from_csv, load_book_from_json,
    logging, save_book_to_json, working_day_count,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use tracing::debug;

/// Per-subject attendance tracking and exam eligibility projection.
#[derive(Parser)]
#[command(name = "attendance-cli", version, about = "Attendance eligibility projection")]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty session snapshot.
    Init(InitArgs),
    /// Add a subject to the session.
    AddSubject(AddSubjectArgs),
    /// Add an exam to the session.
    AddExam(AddExamArgs),
    /// Record one day of attendance for a subject.
    Record(RecordArgs),
    /// Import attendance rows from CSV (subject,date,classes_conducted,classes_attended).
    ImportAttendance(ImportAttendanceArgs),
    /// Bulk-add holidays from a text or CSV file.
    ImportHolidays(ImportHolidaysArgs),
    /// Count class days in an inclusive date range.
    WorkingDays(WorkingDaysArgs),
    /// Project exam eligibility for every subject (or one).
    Eligibility(EligibilityArgs),
}

#[derive(clap::Args)]
struct InitArgs {
    #[arg(short, long)]
    snapshot: PathBuf,
    #[arg(long)]
    name: String,
    #[arg(long, value_parser = parse_date)]
    start: NaiveDate,
    #[arg(long, value_parser = parse_date)]
    end: NaiveDate,
}

#[derive(clap::Args)]
struct AddSubjectArgs {
    #[arg(short, long)]
    snapshot: PathBuf,
    #[arg(long)]
    name: String,
    #[arg(long)]
    code: Option<String>,
    #[arg(long)]
    classes_per_week: u32,
    #[arg(long, default_value_t = 75.0)]
    min_percentage: f64,
}

#[derive(clap::Args)]
struct AddExamArgs {
    #[arg(short, long)]
    snapshot: PathBuf,
    #[arg(long)]
    exam_type: String,
    #[arg(long, value_parser = parse_date)]
    start: NaiveDate,
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
}

#[derive(clap::Args)]
struct RecordArgs {
    #[arg(short, long)]
    snapshot: PathBuf,
    #[arg(long)]
    subject: String,
    #[arg(long, value_parser = parse_date)]
    date: NaiveDate,
    #[arg(long, default_value_t = 1)]
    conducted: u32,
    #[arg(long, default_value_t = 0)]
    attended: u32,
}

#[derive(clap::Args)]
struct ImportAttendanceArgs {
    #[arg(short, long)]
    snapshot: PathBuf,
    #[arg(long)]
    csv: PathBuf,
}

#[derive(clap::Args)]
struct ImportHolidaysArgs {
    #[arg(short, long)]
    snapshot: PathBuf,
    /// Text file with one `YYYY-MM-DD` or `YYYY-MM-DD - Name` per line.
    #[arg(long, conflicts_with = "csv", required_unless_present = "csv")]
    text: Option<PathBuf>,
    /// CSV file with a date column and an optional name column.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(clap::Args)]
struct WorkingDaysArgs {
    #[arg(long, value_parser = parse_date)]
    start: NaiveDate,
    #[arg(long, value_parser = parse_date)]
    end: NaiveDate,
    /// Take holidays from this session snapshot.
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

#[derive(clap::Args)]
struct EligibilityArgs {
    #[arg(short, long)]
    snapshot: PathBuf,
    /// Date to project from (YYYY-MM-DD).
    #[arg(long, value_parser = parse_date)]
    today: NaiveDate,
    #[arg(long)]
    subject: Option<String>,
    /// Path to a projection TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{input}' (expected YYYY-MM-DD)"))
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Error: failed to initialise logging: {e}");
        process::exit(1);
    }

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Init(args) => init(args),
        Command::AddSubject(args) => add_subject(args),
        Command::AddExam(args) => add_exam(args),
        Command::Record(args) => record(args),
        Command::ImportAttendance(args) => import_attendance(args),
        Command::ImportHolidays(args) => import_holidays(args),
        Command::WorkingDays(args) => working_days(args),
        Command::Eligibility(args) => eligibility(args),
    }
}

fn load(path: &Path) -> Result<SessionBook> {
    load_book_from_json(path)
        .with_context(|| format!("failed to load snapshot: {}", path.display()))
}

fn save(book: &SessionBook, path: &Path) -> Result<()> {
    save_book_to_json(book, path)
        .with_context(|| format!("failed to write snapshot: {}", path.display()))
}

fn init(args: InitArgs) -> Result<()> {
    let bounds = SessionBounds::new(args.start, args.end)?;
    let mut session = AcademicSession::new(args.name, bounds);
    session.is_current = true;
    let book = SessionBook::new(session)?;
    save(&book, &args.snapshot)?;
    println!(
        "Session '{}' written to {}",
        book.name(),
        args.snapshot.display()
    );
    Ok(())
}

fn add_subject(args: AddSubjectArgs) -> Result<()> {
    let mut book = load(&args.snapshot)?;
    let mut policy =
        SubjectPolicy::new(args.name, args.classes_per_week).with_minimum_percentage(args.min_percentage);
    policy.code = args.code;
    let name = policy.name.clone();
    book.add_subject(policy)?;
    save(&book, &args.snapshot)?;
    println!("Subject '{name}' added.");
    Ok(())
}

fn add_exam(args: AddExamArgs) -> Result<()> {
    let mut book = load(&args.snapshot)?;
    let mut exam = Exam::new(args.exam_type, args.start);
    exam.end_date = args.end;
    let exam_type = exam.exam_type.clone();
    book.add_exam(exam)?;
    save(&book, &args.snapshot)?;
    println!("Exam '{exam_type}' added.");
    Ok(())
}

fn record(args: RecordArgs) -> Result<()> {
    let mut book = load(&args.snapshot)?;
    let record = AttendanceRecord::new(args.date, args.conducted, args.attended);
    book.record_attendance(&args.subject, record)?;
    save(&book, &args.snapshot)?;
    println!("Attendance for {} on {} recorded.", args.subject, args.date);
    Ok(())
}

fn import_attendance(args: ImportAttendanceArgs) -> Result<()> {
    let mut book = load(&args.snapshot)?;
    let added = load_attendance_from_csv(&mut book, &args.csv)
        .with_context(|| format!("failed to import attendance: {}", args.csv.display()))?;
    save(&book, &args.snapshot)?;
    println!("Imported {added} attendance records.");
    Ok(())
}

fn import_holidays(args: ImportHolidaysArgs) -> Result<()> {
    let mut book = load(&args.snapshot)?;
    let import: HolidayImport = match (&args.text, &args.csv) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            book.import_holiday_text(&text)
        }
        (None, Some(path)) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            book.import_holiday_csv(file)
        }
        (None, None) => bail!("provide --text or --csv"),
    };
    save(&book, &args.snapshot)?;

    println!(
        "Added {} holidays to session '{}'.",
        import.added_count(),
        book.name()
    );
    for error in &import.errors {
        println!("{}", error.message);
    }
    Ok(())
}

fn working_days(args: WorkingDaysArgs) -> Result<()> {
    let holidays = match &args.snapshot {
        Some(path) => load(path)?.holiday_dates(),
        None => HashSet::new(),
    };
    println!("{}", working_day_count(args.start, args.end, &holidays));
    Ok(())
}

fn eligibility(args: EligibilityArgs) -> Result<()> {
    let book = load(&args.snapshot)?;
    let config = match &args.config {
        Some(path) => ProjectionConfig::from_path(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => ProjectionConfig::default(),
    };
    debug!(?config, "projection config");
    let projector = Projector::new(config);

    let summaries = match &args.subject {
        Some(name) => vec![book.eligibility_for(name, &projector, args.today)?],
        None => book.dashboard(&projector, args.today),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No subjects in session '{}'.", book.name());
    }
    for summary in &summaries {
        println!("{}", render_subject_report(summary)?);
    }
    Ok(())
}
