use repertoire::{App, Command, Config, Feedback, Orientation, logging};
use std::error::Error;
use std::io::{self, BufRead, Write};

fn show(feedback: &Feedback, orientation: Orientation) {
    let board = &feedback.board;
    print!("{}", board.diagram(orientation));
    match board.last_move.as_deref() {
        Some(label) => println!("Last move: {}", label),
        None => println!("Start position"),
    }
    if let Some(intro) = board.starting_annotation.as_ref().filter(|a| !a.text.is_empty()) {
        println!("Before: {}", intro.text);
    }
    if let Some(annotation) = board.annotation.as_ref().filter(|a| !a.text.is_empty()) {
        println!("Note: {}", annotation.text);
    }
    if let Some(message) = &feedback.message {
        println!("{}", message);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();

    let config = Config::default();
    let mut app = match App::load(&config) {
        Ok(app) => app,
        Err(err) => {
            log::error!("{}", err);
            return Err(err.into());
        }
    };

    if let Some(title) = app.navigator().tree().headers().title() {
        println!("{}", title);
    }
    println!("<< start, < back, > forward, >> end, ? continuations");
    println!("Type a move in SAN, or an empty line for a random reply.");

    let orientation = app.orientation();
    show(&app.dispatch(Command::Start), orientation);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let feedback = app.dispatch(Command::parse(&line?));
        show(&feedback, orientation);
        io::stdout().flush()?;
    }

    Ok(())
}
