//! Command-line client for the Classpoll live relay.
//!
//! - `watch`: join rooms and print relayed events (professor dashboard)
//! - `answer`: join a quiz as a student and send live answers typed at the prompt
//! - `toggle`: start or stop a quiz live over HTTP
//! - `show`: print a quiz summary over HTTP
//! - `submit`: submit final answers over HTTP
//!
//! Run with:
//! ```not_rust
//! cargo run --bin classpoll-client -- watch --quiz 7 --professor 2
//! cargo run --bin classpoll-client -- answer --quiz 7 --student-id 15 --student-name Hana
//! cargo run --bin classpoll-client -- toggle --quiz 42 --on --professor-name "Dr. Tanaka"
//! cargo run --bin classpoll-client -- submit --quiz 7 --student-id 15 --answer 3:9
//! ```

use clap::{Parser, Subcommand};

use classpoll_client::{
    SessionPlan, StudentIdentity,
    http::{ApiClient, parse_answer_pair, websocket_url},
    run_client,
};
use classpoll_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "classpoll-client")]
#[command(about = "CLI client for Classpoll live quizzes", long_about = None)]
struct Args {
    /// Server base URL
    #[arg(short = 'u', long, default_value = "http://127.0.0.1:8080", global = true)]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Join rooms and print relayed events
    Watch {
        #[arg(long)]
        quiz: Option<i64>,
        #[arg(long)]
        professor: Option<i64>,
        #[arg(long)]
        user: Option<i64>,
    },
    /// Send live answers as a student
    Answer {
        #[arg(long)]
        quiz: i64,
        #[arg(long)]
        student_id: i64,
        #[arg(long)]
        student_name: String,
        /// Also relay answers to this professor's room
        #[arg(long)]
        professor_id: Option<i64>,
    },
    /// Start (--on) or stop (--off) a quiz live
    Toggle {
        #[arg(long)]
        quiz: i64,
        #[arg(long, conflicts_with = "off")]
        on: bool,
        #[arg(long)]
        off: bool,
        #[arg(long)]
        professor_name: String,
    },
    /// Show a quiz summary
    Show {
        #[arg(long)]
        quiz: i64,
    },
    /// Submit final answers
    Submit {
        #[arg(long)]
        quiz: i64,
        #[arg(long)]
        student_id: i64,
        /// `<questionId>:<optionId>`, repeatable
        #[arg(long = "answer", required = true)]
        answers: Vec<String>,
    },
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        Command::Watch {
            quiz,
            professor,
            user,
        } => {
            let plan = SessionPlan::watcher(quiz, professor, user);
            if plan.joins.is_empty() {
                return Err("watch needs at least one of --quiz, --professor, --user".into());
            }
            run_client(websocket_url(&args.url), plan).await
        }
        Command::Answer {
            quiz,
            student_id,
            student_name,
            professor_id,
        } => {
            let plan = SessionPlan::student(StudentIdentity {
                student_id,
                student_name,
                quiz_id: quiz,
                professor_id,
            });
            run_client(websocket_url(&args.url), plan).await
        }
        Command::Toggle {
            quiz,
            on,
            off,
            professor_name,
        } => {
            if on == off {
                return Err("pass exactly one of --on / --off".into());
            }
            let response = ApiClient::new(&args.url)
                .toggle_live(quiz, on, &professor_name)
                .await?;
            println!(
                "{} '{}' sent to {} session(s); confirmation pending",
                response.event, response.data.quiz_title, response.delivered
            );
            Ok(())
        }
        Command::Show { quiz } => {
            let summary = ApiClient::new(&args.url).get_quiz(quiz).await?;
            println!(
                "Quiz {} '{}' (class {}, professor {}): {} question(s), live = {}",
                summary.quiz_id,
                summary.title,
                summary.class_id,
                summary.professor_id,
                summary.question_count,
                summary.is_live_active
            );
            Ok(())
        }
        Command::Submit {
            quiz,
            student_id,
            answers,
        } => {
            let pairs = answers
                .iter()
                .map(String::as_str)
                .map(parse_answer_pair)
                .collect::<Result<Vec<_>, _>>()?;
            let submission = ApiClient::new(&args.url)
                .submit(quiz, student_id, &pairs)
                .await?;
            println!(
                "Submission {}: {}/{} correct (submitted at {})",
                submission.id, submission.score, submission.total_questions, submission.submitted_at
            );
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &["classpoll_client"], "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
