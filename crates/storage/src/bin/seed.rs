use std::fmt;

use tracing::info;
use vedanta_core::model::{
    AnswerOption, CardId, Category, Difficulty, Flashcard, QuestionId, QuizQuestion,
};
use storage::repository::{ContentFilter, Storage};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    keep_existing: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("VEDANTA_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut keep_existing = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = args.next().ok_or(ArgsError::MissingValue { flag: "--db" })?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--keep-existing" => keep_existing = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            keep_existing,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --keep-existing     Skip seeding when content is already present");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  VEDANTA_DB_URL");
}

fn seed_flashcards() -> Vec<Flashcard> {
    let rows: [(&str, &str, &str, Category, Difficulty); 6] = [
        (
            "आत्मन्",
            "Atman",
            "The eternal soul, the true Self beyond body and mind.",
            Category::core_concepts(),
            Difficulty::Beginner,
        ),
        (
            "ब्रह्मन्",
            "Brahman",
            "The ultimate reality pervading all existence.",
            Category::core_concepts(),
            Difficulty::Intermediate,
        ),
        (
            "धर्म",
            "Dharma",
            "Righteous duty and the moral law that upholds order.",
            Category::ethics(),
            Difficulty::Beginner,
        ),
        (
            "कर्म",
            "Karma",
            "The law of cause and effect governing every action.",
            Category::ethics(),
            Difficulty::Beginner,
        ),
        (
            "प्राणायाम",
            "Pranayama",
            "Breath regulation that steadies the life force.",
            Category::practices(),
            Difficulty::Intermediate,
        ),
        (
            "समाधि",
            "Samadhi",
            "The meditative absorption where seer and seen merge.",
            Category::practices(),
            Difficulty::Advanced,
        ),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (sanskrit, english, meaning, category, difficulty))| {
            Flashcard::new(
                CardId::new(i as u64 + 1),
                sanskrit,
                english,
                meaning,
                category,
                difficulty,
                None,
            )
            .expect("seed flashcards are well-formed")
        })
        .collect()
}

fn seed_questions() -> Vec<QuizQuestion> {
    let rows: [(&str, [&str; 4], AnswerOption, &str, Category, Difficulty); 4] = [
        (
            "What is Moksha?",
            [
                "Liberation from the cycle of rebirth",
                "Material wealth and prosperity",
                "Political power and influence",
                "Fame and recognition",
            ],
            AnswerOption::A,
            "Moksha means liberation from samsara, the cycle of death and rebirth.",
            Category::core_concepts(),
            Difficulty::Beginner,
        ),
        (
            "What does Dharma represent?",
            [
                "Selfish desires",
                "Righteous duty and moral law",
                "Material possessions",
                "Physical strength",
            ],
            AnswerOption::B,
            "Dharma encompasses righteous duty and ethical conduct.",
            Category::ethics(),
            Difficulty::Beginner,
        ),
        (
            "What is the purpose of Pranayama?",
            [
                "Physical exercise only",
                "To control life force through breathing",
                "To increase lung capacity",
                "To reduce stress only",
            ],
            AnswerOption::B,
            "Pranayama controls prana through breathing exercises.",
            Category::practices(),
            Difficulty::Intermediate,
        ),
        (
            "What is Samadhi?",
            [
                "A yoga posture",
                "A religious festival",
                "The highest state of meditation",
                "A sacred mantra",
            ],
            AnswerOption::C,
            "Samadhi is the meditative state where subject and object merge.",
            Category::practices(),
            Difficulty::Advanced,
        ),
    ];

    rows.into_iter()
        .enumerate()
        .map(
            |(i, (question, options, correct, explanation, category, difficulty))| {
                QuizQuestion::new(
                    QuestionId::new(i as u64 + 1),
                    question,
                    options.map(str::to_owned),
                    correct,
                    explanation,
                    category,
                    difficulty,
                )
                .expect("seed questions are well-formed")
            },
        )
        .collect()
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;

    if args.keep_existing {
        let existing = storage.content.list_flashcards(&ContentFilter::any()).await?;
        if !existing.is_empty() {
            info!(count = existing.len(), "content already present, skipping seed");
            return Ok(());
        }
    }

    let flashcards = seed_flashcards();
    let questions = seed_questions();
    storage.content.replace_flashcards(&flashcards).await?;
    storage.content.replace_questions(&questions).await?;

    info!(
        flashcards = flashcards.len(),
        questions = questions.len(),
        db = %args.db_url,
        "seeded content"
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
