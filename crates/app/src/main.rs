use std::fmt;
use std::io::Write as _;
use std::path::PathBuf;

use quiz_core::model::{Advance, Answer, Difficulty, Question, QuestionDraft, Session};
use services::{AppServices, Clock, QuizService, RevealAnimator, StoreConfig};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play [--questions <path>]");
    eprintln!("  cargo run -p app -- seed [--questions <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --questions data/questions.json");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUESTIONS_PATH, GITHUB_TOKEN, GITHUB_OWNER, GITHUB_REPO, GITHUB_BRANCH");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Seed,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "seed" => Some(Self::Seed),
            _ => None,
        }
    }
}

struct Args {
    questions_path: Option<PathBuf>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut questions_path = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    questions_path = Some(PathBuf::from(value));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }
        Ok(Self { questions_path })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: playing when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = StoreConfig::from_env();
    if let Some(path) = parsed.questions_path {
        config.questions_path = path;
    }

    match cmd {
        Command::Play => {
            let services = AppServices::from_config(config, Clock::default_clock()).await?;
            play(services.quiz().as_ref()).await
        }
        Command::Seed => seed(&config.questions_path).await,
    }
}

//
// ─── PLAY ──────────────────────────────────────────────────────────────────────
//

const CHOICE_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

async fn play(quiz: &QuizService) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = quiz.start_session().await?;
    let mut animator = RevealAnimator::new();

    println!("Money ladder: {:?}", session.ladder().values());
    println!("You have {} lives. Good luck!", session.lives());

    while !session.is_finished() {
        print_question(&session);
        let Some(choice) = read_choice(session.displayed_answers().len())? else {
            println!("Quitting. You leave with ${}.", session.bank());
            return Ok(());
        };

        let outcome = session.submit_answer(choice)?;
        if outcome.correct {
            println!("Correct!");
            let steps = session.ladder().reveal_steps(outcome.reveal_target);
            animate_reveal(&mut animator, steps).await;
        } else {
            let correct = session
                .correct_display_index()
                .map(|i| CHOICE_LABELS[i])
                .unwrap_or('?');
            println!("Wrong. The answer was {correct}.");
        }
        println!("Bank: ${}   Lives: {}", outcome.bank, outcome.lives);

        session.acknowledge_reward()?;
        while !session.pending_checkpoints().is_empty() {
            let amount = session.acknowledge_checkpoint()?;
            println!("Checkpoint secured: ${amount} is yours to keep.");
        }
        if quiz.acknowledge_lives(&mut session)? == Advance::Finished {
            break;
        }
    }

    let amount = session.final_amount().unwrap_or(0);
    if session.eliminated() {
        println!("Out of lives. You walk away with ${amount}.");
    } else {
        println!(
            "That was the last question! Final score {} of {}, winnings ${amount}.",
            session.score(),
            session.total_questions()
        );
    }
    Ok(())
}

fn print_question(session: &Session) {
    let Some(question) = session.current_question() else {
        return;
    };
    println!();
    println!(
        "Question {} of {} ({}) for ${}:",
        session.question_index() + 1,
        session.total_questions(),
        question.difficulty().as_str(),
        session.ladder().next_value(session.bank())
    );
    println!("  {}", question.prompt());
    for (label, answer) in CHOICE_LABELS.iter().zip(session.displayed_answers()) {
        println!("    {label}. {}", answer.text);
    }
}

/// Prompt until the player picks one of the first `max` labels, or `None` on
/// `q`/end of input.
fn read_choice(max: usize) -> Result<Option<usize>, std::io::Error> {
    loop {
        print!("Your answer [{}]: ", &"ABCD"[..max]);
        std::io::stdout().flush()?;
        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let input = line.trim();
        if input.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        let choice = input
            .chars()
            .next()
            .and_then(|c| CHOICE_LABELS.iter().position(|l| l.eq_ignore_ascii_case(&c)));
        match choice {
            Some(index) if index < max => return Ok(Some(index)),
            _ => println!("Please answer with one of {}.", &"ABCD"[..max]),
        }
    }
}

/// Count the displayed amount up through `steps`, one line per tick.
async fn animate_reveal(animator: &mut RevealAnimator, steps: Vec<u64>) {
    let count = steps.len();
    let mut rx = animator.watch();
    animator.start(steps);
    for _ in 0..count {
        if rx.changed().await.is_err() {
            break;
        }
        println!("  ... ${}", *rx.borrow_and_update());
    }
}

//
// ─── SEED ──────────────────────────────────────────────────────────────────────
//

async fn seed(path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let questions = starter_questions()?;
    let storage = Storage::json_file(path);
    storage.questions.save(&questions).await?;
    println!(
        "Wrote {} starter questions to {}.",
        questions.len(),
        path.display()
    );
    Ok(())
}

fn starter_questions() -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    // The first listed answer is the correct one; play shuffles the display.
    let drafts = [
        (
            "Which planet is known as the Red Planet?",
            Difficulty::Easy,
            ["Mars", "Venus", "Jupiter", "Mercury"],
        ),
        (
            "What is the largest ocean on Earth?",
            Difficulty::Easy,
            ["Pacific", "Atlantic", "Indian", "Arctic"],
        ),
        (
            "Which element has the chemical symbol Fe?",
            Difficulty::Medium,
            ["Iron", "Fluorine", "Lead", "Tin"],
        ),
        (
            "In which year did the Berlin Wall fall?",
            Difficulty::Medium,
            ["1989", "1991", "1987", "1993"],
        ),
        (
            "Which composer wrote The Magic Flute?",
            Difficulty::Hard,
            ["Mozart", "Beethoven", "Haydn", "Schubert"],
        ),
        (
            "What is the only metal that is liquid at room temperature?",
            Difficulty::Hard,
            ["Mercury", "Gallium", "Caesium", "Bromine"],
        ),
        (
            "Which country spans the most time zones, territories included?",
            Difficulty::VeryHard,
            ["France", "Russia", "United States", "United Kingdom"],
        ),
        (
            "What is the smallest prime number greater than 100?",
            Difficulty::VeryHard,
            ["101", "103", "107", "109"],
        ),
    ];

    drafts
        .into_iter()
        .enumerate()
        .map(|(n, (prompt, difficulty, answers))| {
            let question = QuestionDraft {
                id: format!("q-seed-{}", n + 1),
                prompt: prompt.to_string(),
                difficulty,
                answers: answers
                    .iter()
                    .enumerate()
                    .map(|(i, text)| Answer::new(*text, i == 0))
                    .collect(),
            }
            .validate()?;
            Ok(question)
        })
        .collect()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
