//! Stream a summary of a local HTML or text file.
//!
//! Set GLM_API_KEY in your environment and run:
//!   cargo run --example summarize -- path/to/article.html

use std::io::Write;

use futures::StreamExt;
use gist_provider_glm::{Glm, Token, Transcript};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .ok_or("usage: summarize <article-file>")?;
    let article = std::fs::read_to_string(&path)?;

    let client = Glm::from_env()?;
    let mut handle = client.summarize(&article).await;

    let mut transcript = Transcript::new();
    let mut stdout = std::io::stdout();
    while let Some(token) = handle.receiver.next().await {
        if let Token::Content(text) = &token {
            write!(stdout, "{text}")?;
            stdout.flush()?;
        }
        transcript.push(&token);
    }
    writeln!(stdout)?;

    // Content was already printed progressively; only the other outcomes need text.
    let outcome = transcript.finish();
    if !matches!(outcome, gist_provider_glm::Outcome::Summary(_)) {
        eprintln!("{}", outcome.display_text());
    }

    Ok(())
}
