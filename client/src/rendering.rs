use crate::game::GameSnapshot;
use log::warn;
use macroquad::audio::{load_sound, play_sound, PlaySoundParams, Sound};
use macroquad::prelude::*;
use shared::{PlayerId, BALL_RADIUS, PADDLE_HEIGHT, PADDLE_WIDTH};

const GOLD: Color = Color::new(1.0, 0.84, 0.0, 1.0);
const BACKGROUND: Color = Color::new(0.12, 0.12, 0.12, 1.0);
const ACCENT: Color = Color::new(0.35, 0.78, 1.0, 1.0);

const LEFT_PADDLE_X: f32 = 20.0;
const RIGHT_PADDLE_MARGIN: f32 = 52.0;

/// What the game screen should show this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameView {
    Waiting,
    Countdown,
    Winner,
    Playing,
}

impl GameView {
    pub fn of(snapshot: &GameSnapshot) -> Self {
        if snapshot.disconnected {
            GameView::Waiting
        } else if snapshot.countdown_active() {
            GameView::Countdown
        } else if snapshot.winner.is_some() {
            GameView::Winner
        } else if snapshot.is_playable() {
            GameView::Playing
        } else {
            GameView::Waiting
        }
    }
}

/// Sound effects keyed by the server's one-shot event tags.
pub struct SoundBank {
    platform_hit: Option<Sound>,
    wall_hit: Option<Sound>,
}

impl SoundBank {
    pub async fn load() -> Self {
        Self {
            platform_hit: Self::load_one("pingball.wav").await,
            wall_hit: Self::load_one("ball-bounce.wav").await,
        }
    }

    async fn load_one(path: &str) -> Option<Sound> {
        match load_sound(path).await {
            Ok(sound) => Some(sound),
            Err(e) => {
                warn!("Could not load sound {}: {}", path, e);
                None
            }
        }
    }

    pub fn play(&self, event: &str) {
        let (sound, volume) = match event {
            "platform_hit" => (self.platform_hit.as_ref(), 0.4),
            "wall_hit" => (self.wall_hit.as_ref(), 0.5),
            _ => (None, 0.0),
        };

        if let Some(sound) = sound {
            play_sound(
                sound,
                PlaySoundParams {
                    looped: false,
                    volume,
                },
            );
        }
    }
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn render(&mut self, snapshot: &GameSnapshot, player_id: PlayerId) {
        match GameView::of(snapshot) {
            GameView::Waiting => self.draw_waiting("Waiting for players"),
            GameView::Countdown => self.draw_countdown(snapshot.countdown.unwrap_or(0.0)),
            GameView::Winner => {
                self.draw_winner(snapshot.is_winner(player_id).unwrap_or(false))
            }
            GameView::Playing => self.draw_game(snapshot),
        }
    }

    pub fn draw_menu(&mut self) {
        clear_background(BACKGROUND);
        self.draw_centered("Ping-Pong", self.height / 2.0 - 120.0, 96.0, GOLD);
        self.draw_button("Play (Enter)", self.height / 2.0 + 10.0);
        self.draw_button("Quit (Esc)", self.height / 2.0 + 90.0);
        self.draw_centered("W/S or Up/Down to move", self.height - 40.0, 28.0, WHITE);
    }

    pub fn draw_connecting(&mut self, address: &str) {
        self.draw_waiting(&format!("Connecting to {}", address));
        self.draw_centered("Esc to cancel", self.height / 2.0 + 60.0, 28.0, WHITE);
    }

    fn draw_waiting(&mut self, message: &str) {
        clear_background(BLACK);
        let dots = ".".repeat(((get_time() * 2.0) as usize) % 4);
        self.draw_centered(&format!("{}{}", message, dots), self.height / 2.0, 36.0, WHITE);
    }

    fn draw_countdown(&mut self, countdown: f32) {
        clear_background(BLACK);
        let size = 72.0 + 10.0 * (1.0 - countdown.fract());
        self.draw_centered(&format!("{}", countdown as u32), self.height / 2.0, size, WHITE);
    }

    fn draw_winner(&mut self, is_winner: bool) {
        clear_background(Color::new(0.08, 0.08, 0.08, 1.0));
        let message = if is_winner {
            "You won!"
        } else {
            "Better luck next time!"
        };
        self.draw_centered(message, self.height / 2.0, 72.0, GOLD);
        self.draw_centered(
            "Press R to restart, Esc for menu",
            self.height / 2.0 + 100.0,
            36.0,
            GOLD,
        );
    }

    fn draw_game(&mut self, snapshot: &GameSnapshot) {
        clear_background(BACKGROUND);
        self.draw_center_line();

        if let Some(left) = snapshot.paddle(0) {
            self.draw_paddle(LEFT_PADDLE_X, left, GREEN);
        }
        if let Some(right) = snapshot.paddle(1) {
            self.draw_paddle(self.width - RIGHT_PADDLE_MARGIN, right, MAGENTA);
        }

        if let Some(ball) = snapshot.ball {
            draw_circle(ball.x, ball.y, BALL_RADIUS * 2.0, Color::new(1.0, 1.0, 1.0, 0.12));
            draw_circle(ball.x, ball.y, BALL_RADIUS, WHITE);
        }

        if let Some([left, right]) = snapshot.scores {
            self.draw_score(self.width / 4.0, left);
            self.draw_score(self.width * 3.0 / 4.0, right);
        }
    }

    fn draw_center_line(&mut self) {
        let mut y = 0.0;
        while y < self.height {
            draw_rectangle(self.width / 2.0 - 2.0, y, 4.0, 10.0, WHITE);
            y += 20.0;
        }
    }

    fn draw_paddle(&mut self, x: f32, y: f32, color: Color) {
        draw_rectangle(x, y, PADDLE_WIDTH, PADDLE_HEIGHT, color);
        draw_rectangle_lines(x, y, PADDLE_WIDTH, PADDLE_HEIGHT, 2.0, WHITE);
    }

    fn draw_score(&mut self, center_x: f32, score: u32) {
        let text = score.to_string();
        let dims = measure_text(&text, None, 36, 1.0);
        let (pad_x, pad_y) = (16.0, 10.0);
        draw_rectangle(
            center_x - dims.width / 2.0 - pad_x,
            40.0 - dims.height / 2.0 - pad_y,
            dims.width + pad_x * 2.0,
            dims.height + pad_y * 2.0,
            Color::new(0.0, 0.0, 0.0, 0.67),
        );
        draw_text(
            &text,
            center_x - dims.width / 2.0,
            40.0 + dims.height / 2.0,
            36.0,
            GOLD,
        );
    }

    fn draw_button(&mut self, label: &str, center_y: f32) {
        let (w, h) = (240.0, 64.0);
        let x = self.width / 2.0 - w / 2.0;
        let y = center_y - h / 2.0;
        draw_rectangle(x, y, w, h, Color::new(0.16, 0.16, 0.16, 1.0));
        draw_rectangle_lines(x, y, w, h, 2.0, ACCENT);
        self.draw_centered(label, center_y, 36.0, WHITE);
    }

    fn draw_centered(&mut self, text: &str, center_y: f32, size: f32, color: Color) {
        let dims = measure_text(text, None, size as u16, 1.0);
        draw_text(
            text,
            self.width / 2.0 - dims.width / 2.0,
            center_y + dims.height / 2.0,
            size,
            color,
        );
    }
}
