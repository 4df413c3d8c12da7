//! Line-oriented terminal front end for a `QuizSession`.

use std::time::Duration;

use exam_core::model::{ChoiceId, GradeResult, SessionMode, SessionPhase, Topic};
use services::{QuizSession, SessionEvent, SessionSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};
use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// How the loop opens.
#[derive(Debug, Clone, Copy)]
pub enum Start {
    Practice(Topic),
    Exam,
}

enum Flow {
    Continue,
    Quit,
}

/// Drive `session` from stdin until the user quits or input ends.
///
/// # Errors
///
/// Returns an I/O error if stdin cannot be read.
pub async fn run(mut session: QuizSession, start: Start) -> std::io::Result<()> {
    print_help();
    match start {
        Start::Practice(topic) => {
            session.start_practice(topic);
        }
        Start::Exam => {
            session.start_exam();
        }
    }
    render(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();
    let mut advance_at: Option<Instant> = None;

    loop {
        let advance_deadline = advance_at.unwrap_or_else(Instant::now);
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if let Flow::Quit = handle_line(&mut session, line.trim()) {
                    break;
                }
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                let event = session.tick(now - last_tick);
                last_tick = now;
                announce(&session, event);
            }
            () = sleep_until(advance_deadline), if advance_at.is_some() => {
                let now = Instant::now();
                let event = session.tick(now - last_tick);
                last_tick = now;
                announce(&session, event);
            }
        }
        advance_at = session.advance_due_in().map(|due| Instant::now() + due);
    }

    print_score(&SessionSnapshot::capture(&session));
    Ok(())
}

fn handle_line(session: &mut QuizSession, input: &str) -> Flow {
    match input.to_ascii_lowercase().as_str() {
        "" => {}
        "q" | "quit" => return Flow::Quit,
        "h" | "help" | "?" => print_help(),
        "s" | "score" => print_score(&SessionSnapshot::capture(session)),
        "r" | "reveal" => match session.toggle_reveal() {
            Ok(_) => render(session),
            Err(err) => println!("{err}"),
        },
        "n" | "next" => match session.next_question() {
            Ok(_) => render(session),
            Err(err) => println!("{err}"),
        },
        "e" | "exam" => {
            session.start_exam();
            render(session);
        }
        "p" | "practice" => {
            let topic = session.practice_topic().unwrap_or(Topic::Mixed);
            session.start_practice(topic);
            render(session);
        }
        other => match other.parse::<ChoiceId>() {
            Ok(choice) => {
                if session.submit(choice).is_none() {
                    println!("Already answered. Press n for the next question.");
                } else {
                    render(session);
                }
            }
            Err(_) => {
                if let Some(topic) = other.strip_prefix("topic ") {
                    match topic.parse::<Topic>() {
                        Ok(topic) => {
                            session.start_practice(topic);
                            render(session);
                        }
                        Err(err) => println!("{err}"),
                    }
                } else {
                    println!("Unrecognized input: {other}");
                }
            }
        },
    }
    Flow::Continue
}

fn announce(session: &QuizSession, event: Option<SessionEvent>) {
    let Some(event) = event else { return };
    debug!(?event, "session event");
    match event {
        SessionEvent::TimedOut => {
            println!("Time is up.");
            render(session);
        }
        SessionEvent::Advanced => render(session),
        SessionEvent::Completed => {
            println!();
            println!("Exam complete.");
            print_score(&SessionSnapshot::capture(session));
        }
    }
}

fn render(session: &QuizSession) {
    let view = SessionSnapshot::capture(session);
    let Some(question) = &view.question else {
        println!("No question. Press p for practice or e for an exam.");
        return;
    };

    println!();
    let mut header = match (view.mode, view.exam) {
        (SessionMode::Exam, Some(exam)) => format!(
            "[Exam {}/{} | {}",
            exam.index + 1,
            exam.total,
            view.portion.as_str()
        ),
        _ => format!("[Practice | {}", view.portion.as_str()),
    };
    if let Some(seconds) = view.remaining_seconds {
        header.push_str(&format!(" | {}:{:02}", seconds / 60, seconds % 60));
    }
    println!("{header}] {}", question.topic().label());
    println!("{}", question.prompt());
    for choice in question.choices() {
        let marker = if view.selected == Some(choice.id) { '>' } else { ' ' };
        println!(" {marker} {}) {}", choice.id.as_str(), choice.text);
    }

    if view.phase != SessionPhase::Graded {
        return;
    }
    match view.result {
        Some(GradeResult::Correct) => println!("Correct."),
        Some(GradeResult::Incorrect) => println!(
            "Incorrect. Answer: {}",
            question.correct_choice_id().as_str()
        ),
        None => {}
    }
    if view.shows_answer() {
        println!("  {}", question.answer_text());
        for step in question.steps() {
            println!("  - {}: {}", step.label, step.detail);
        }
        println!("  Refs: {}", question.refs().join(", "));
    } else {
        println!("  (r to reveal the explanation)");
    }
    print_score(&view);
}

fn print_score(view: &SessionSnapshot) {
    println!(
        "Score: {}/{} ({}%)",
        view.tally.correct, view.tally.attempted, view.percent
    );
}

fn print_help() {
    println!("Answer with a, b, c or d.");
    println!("  n  next practice question     r  toggle explanation");
    println!("  e  start exam                 p  back to practice");
    println!("  topic <id>  practice a topic  s  score   q  quit");
}
