//! Per-connection game flow
//!
//! A session alternates between drawing the current screen (ending in an
//! INPUT prompt) and updating state from the player's reply:
//!
//! ```text
//! MainMenu --1--> Playing --mine hit / all flagged--> GameOver --any--> MainMenu
//!    |  \--2--> Leaderboard --any--> MainMenu          |
//!    |                                                 \--Q--> MainMenu
//!    \--3--> Exit
//! ```
//!
//! Sessions own their field and are never shared between workers; the only
//! shared state they touch is the leaderboard, updated once per finished game.

use crate::auth::CredentialStore;
use crate::coordinate::{parse_coordinate, CoordinateError};
use crate::game::{Field, RevealOutcome};
use crate::leaderboard::SharedLeaderboard;
use crate::render::{render, View};
use log::info;
use rand::rngs::StdRng;
use shared::{Channel, ProtocolError};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};

const BANNER: &str = "===================================================\n";
const TITLE: &str = "------- Minesweeper -------\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    Playing,
    GameOver,
    Leaderboard,
    Exit,
}

/// Shows the welcome banner, asks for credentials and checks them.
///
/// Returns the username on success. On failure the rejection is sent with
/// the EXIT code and `None` is returned; the caller only has to close.
pub async fn authenticate<S>(
    channel: &mut Channel<S>,
    credentials: &dyn CredentialStore,
) -> Result<Option<String>, ProtocolError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    channel.print(BANNER).await?;
    channel.print("= Welcome to the online Minesweeper gaming system =\n").await?;
    channel.print(BANNER).await?;
    channel.print("\n").await?;

    let username = channel.prompt("Username: ").await?;
    let password = channel.prompt("Password: ").await?;

    channel.print("\n").await?;
    if credentials.verify(&username, &password) {
        channel.print("Login successful\n").await?;
        channel.print("\n").await?;
        Ok(Some(username))
    } else {
        channel
            .exit("Username or password is incorrect. Disconnecting...\n")
            .await?;
        Ok(None)
    }
}

pub struct Session<S> {
    channel: Channel<S>,
    username: String,
    leaderboard: SharedLeaderboard,
    rng: StdRng,
    field: Field,
    screen: Screen,
    started: Instant,
    time_taken: u64,
    won: bool,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(
        channel: Channel<S>,
        username: impl Into<String>,
        leaderboard: SharedLeaderboard,
        rng: StdRng,
    ) -> Self {
        Self {
            channel,
            username: username.into(),
            leaderboard,
            rng,
            field: Field::default(),
            screen: Screen::MainMenu,
            started: Instant::now(),
            time_taken: 0,
            won: false,
        }
    }

    /// Runs screens until the player quits, then sends the farewell EXIT.
    pub async fn run(&mut self) -> Result<(), ProtocolError> {
        while self.screen != Screen::Exit {
            let input = self.draw().await?;
            self.update(&input).await?;
        }

        self.channel
            .exit("Thanks for playing! Disconnecting...\n")
            .await
    }

    async fn print_lines<T: AsRef<str>>(&mut self, lines: &[T]) -> Result<(), ProtocolError> {
        for line in lines {
            self.channel.print(line.as_ref()).await?;
        }
        Ok(())
    }

    /// Draws the current screen and returns the player's reply to its prompt.
    async fn draw(&mut self) -> Result<String, ProtocolError> {
        self.print_lines(&["\n", BANNER, "\n"]).await?;

        match self.screen {
            Screen::MainMenu => self.draw_main_menu().await,
            Screen::Playing => self.draw_playing().await,
            Screen::GameOver => self.draw_game_over().await,
            Screen::Leaderboard => self.draw_leaderboard().await,
            Screen::Exit => Ok(String::new()),
        }
    }

    async fn draw_main_menu(&mut self) -> Result<String, ProtocolError> {
        self.print_lines(&[
            "Welcome to the Minesweeper gaming system.\n",
            "\n",
            "Please enter a selection:\n",
            "<1> Play Minesweeper\n",
            "<2> Show Leaderboard\n",
            "<3> Quit\n",
        ])
        .await?;
        self.channel.prompt("Selection Option (1-3): ").await
    }

    async fn draw_playing(&mut self) -> Result<String, ProtocolError> {
        let remaining = format!("Mines remaining: {}\n", self.field.mines_remaining());
        self.print_lines(&[TITLE, "\n", remaining.as_str(), "\n"]).await?;

        let rows = render(&self.field, View::Playing);
        self.print_lines(&rows).await?;

        self.print_lines(&[
            "\n",
            "Choose an option: \n",
            "(R)eveal tile\n",
            "(P)lace flag\n",
            "(Q)uit game\n",
            "\n",
        ])
        .await?;
        self.channel.prompt("Option (R,P,Q): ").await
    }

    async fn draw_game_over(&mut self) -> Result<String, ProtocolError> {
        self.print_lines(&[TITLE, "\n"]).await?;

        if self.won {
            let time = format!("Time taken: {} seconds\n", self.time_taken);
            self.print_lines(&["You've won!\n", time.as_str()]).await?;
        } else {
            self.channel.print("Game Over! You've hit a mine\n").await?;
        }
        self.channel.print("\n").await?;

        let rows = render(&self.field, View::GameOver { won: self.won });
        self.print_lines(&rows).await?;

        self.channel.print("\n").await?;
        self.channel.prompt("Press <Enter> to continue...\n").await
    }

    async fn draw_leaderboard(&mut self) -> Result<String, ProtocolError> {
        // Copy the rows out so the lock is not held across network writes
        let rows = self.leaderboard.read().await.rows();

        self.print_lines(&["------- Leaderboard -------\n", "\n"]).await?;

        if rows.is_empty() {
            self.print_lines(&[
                "There is no information currently stored in the leaderboard.\n",
                "Try again later.\n",
            ])
            .await?;
        } else {
            let lines: Vec<String> = rows
                .iter()
                .map(|row| {
                    format!(
                        "{}\t{} seconds\t{} games won, {} games played\n",
                        row.username, row.time_taken, row.games_won, row.games_played
                    )
                })
                .collect();
            self.print_lines(&lines).await?;
        }

        self.channel.print("\n").await?;
        self.channel.prompt("Press <Enter> to continue...\n").await
    }

    async fn update(&mut self, input: &str) -> Result<(), ProtocolError> {
        match self.screen {
            Screen::MainMenu => self.update_main_menu(input).await,
            Screen::Playing => self.update_playing(input).await,
            Screen::GameOver | Screen::Leaderboard => {
                self.screen = Screen::MainMenu;
                Ok(())
            }
            Screen::Exit => Ok(()),
        }
    }

    async fn update_main_menu(&mut self, input: &str) -> Result<(), ProtocolError> {
        match input.trim() {
            "1" => self.start_game(),
            "2" => self.screen = Screen::Leaderboard,
            "3" => self.screen = Screen::Exit,
            _ => {
                self.channel
                    .print("Not a valid input! Choose a number between 1 and 3\n")
                    .await?;
            }
        }
        Ok(())
    }

    async fn update_playing(&mut self, input: &str) -> Result<(), ProtocolError> {
        match input.trim().to_ascii_uppercase().as_str() {
            "R" => self.reveal_prompt().await?,
            "P" => self.flag_prompt().await?,
            "Q" => {
                self.screen = Screen::MainMenu;
                return Ok(());
            }
            _ => {
                self.channel
                    .print("Not a valid input! Choose a letter from (R, P, Q)\n")
                    .await?;
            }
        }

        if self.screen == Screen::Playing && self.field.is_cleared() {
            self.finish(true).await;
        }
        Ok(())
    }

    async fn reveal_prompt(&mut self) -> Result<(), ProtocolError> {
        let Some((x, y)) = self.prompt_coordinate().await? else {
            return Ok(());
        };

        if self.field.reveal(x, y) == RevealOutcome::Mine {
            self.finish(false).await;
        }
        Ok(())
    }

    async fn flag_prompt(&mut self) -> Result<(), ProtocolError> {
        let Some((x, y)) = self.prompt_coordinate().await? else {
            return Ok(());
        };

        if !self.field.flag(x, y) {
            self.channel
                .print("There is no mine at this location.\n")
                .await?;
        }
        Ok(())
    }

    /// Asks for a tile; reports a bad coordinate to the player and yields `None`.
    async fn prompt_coordinate(&mut self) -> Result<Option<(usize, usize)>, ProtocolError> {
        let reply = self.channel.prompt("Enter tile coordinate: ").await?;

        match parse_coordinate(reply.trim()) {
            Ok(position) => Ok(Some(position)),
            Err(CoordinateError::WrongLength) => {
                self.channel
                    .print("A coordinate is only two characters. Example: A1 or 1A, B5 or 5B.\n")
                    .await?;
                Ok(None)
            }
            Err(_) => {
                self.channel.print("Coordinate does not exist.\n").await?;
                Ok(None)
            }
        }
    }

    fn start_game(&mut self) {
        self.field = Field::generate(&mut self.rng);
        self.started = Instant::now();
        self.time_taken = 0;
        self.won = false;
        self.screen = Screen::Playing;
    }

    async fn finish(&mut self, won: bool) {
        self.time_taken = self.started.elapsed().as_secs();
        self.won = won;
        self.screen = Screen::GameOver;

        self.leaderboard
            .write()
            .await
            .record_result(&self.username, won, self.time_taken);

        info!(
            "{} {} a game in {} seconds",
            self.username,
            if won { "won" } else { "lost" },
            self.time_taken
        );
    }
}
