//! Interactive front end.
//! The session walks AwaitingFile -> AwaitingLanguage -> Translating and
//! ends in Done or Failed. Each wait for user input has its own timeout.

use anyhow::Result;
use srtbot_core::translate::process_file;
use srtbot_core::{Backend, BatchTranslator, Language};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::time::timeout;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum State {
    AwaitingFile,
    AwaitingLanguage { input: PathBuf },
    Translating { input: PathBuf, language: Language },
    Done(PathBuf),
    /// Holds the message shown to the user.
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub file: Duration,
    pub language: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            file: Duration::from_secs(120),
            language: Duration::from_secs(30),
        }
    }
}

enum Input {
    Line(String),
    Closed,
    TimedOut,
}

pub struct Session<'a, B, R, W> {
    translator: &'a BatchTranslator<B>,
    lines: Lines<R>,
    out: W,
    timeouts: Timeouts,
}

impl<'a, B, R, W> Session<'a, B, R, W>
where
    B: Backend,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(translator: &'a BatchTranslator<B>, input: R, out: W, timeouts: Timeouts) -> Self {
        Self {
            translator,
            lines: input.lines(),
            out,
            timeouts,
        }
    }

    /// Drive the session to a final state. Errors are terminal I/O failures only.
    pub async fn run(mut self) -> Result<State> {
        let mut state = State::AwaitingFile;
        loop {
            state = match state {
                State::AwaitingFile => self.await_file().await?,
                State::AwaitingLanguage { input } => self.await_language(input).await?,
                State::Translating { input, language } => self.translate(input, language).await?,
                State::Done(path) => {
                    self.say(&format!("Here's your translated SRT file: {}", path.display()))
                        .await?;
                    return Ok(State::Done(path));
                }
                State::Failed(message) => {
                    self.say(&message).await?;
                    return Ok(State::Failed(message));
                }
            };
        }
    }

    async fn await_file(&mut self) -> Result<State> {
        self.say("Please enter the path of an SRT file to translate.")
            .await?;
        let line = match self.read_line(self.timeouts.file).await? {
            Input::Line(line) => line,
            Input::Closed => return Ok(State::Failed("No input received.".into())),
            Input::TimedOut => return Ok(State::Failed("Timed out. Please try again.".into())),
        };
        let input = PathBuf::from(line.trim());
        let is_srt = input
            .extension()
            .map(|e| e.eq_ignore_ascii_case("srt"))
            .unwrap_or(false);
        if !is_srt {
            return Ok(State::Failed("Please provide a valid SRT file.".into()));
        }
        if !input.is_file() {
            return Ok(State::Failed(format!("Could not find {}.", input.display())));
        }
        Ok(State::AwaitingLanguage { input })
    }

    async fn await_language(&mut self, input: PathBuf) -> Result<State> {
        self.say("Please specify the target language (e.g., french, spanish, german, etc.)")
            .await?;
        let line = match self.read_line(self.timeouts.language).await? {
            Input::Line(line) => line,
            Input::Closed => return Ok(State::Failed("No input received.".into())),
            Input::TimedOut => return Ok(State::Failed("Timed out. Please try again.".into())),
        };
        match line.parse::<Language>() {
            Ok(language) => Ok(State::Translating { input, language }),
            Err(_) => Ok(State::Failed(format!(
                "Unsupported language. Supported languages are: {}",
                Language::supported_names()
            ))),
        }
    }

    async fn translate(&mut self, input: PathBuf, language: Language) -> Result<State> {
        self.say("Translation in progress... Please wait.").await?;
        info!("translating {} to {}", input.display(), language);
        match process_file(&input, None, self.translator, language).await {
            Ok(path) => Ok(State::Done(path)),
            Err(err) => {
                error!("error in translate session: {:#}", err);
                Ok(State::Failed(
                    "An error occurred during translation. Please try again.".into(),
                ))
            }
        }
    }

    async fn read_line(&mut self, wait: Duration) -> Result<Input> {
        match timeout(wait, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => Ok(Input::Line(line)),
            Ok(Ok(None)) => Ok(Input::Closed),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Ok(Input::TimedOut),
        }
    }

    async fn say(&mut self, message: &str) -> Result<()> {
        self.out.write_all(message.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        self.out.flush().await?;
        Ok(())
    }
}
