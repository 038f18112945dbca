use std::time::{Duration, Instant};

use rand::Rng;

pub const PIECE_COUNT: usize = 50;
pub const PIECE_SIZE: f32 = 10.0;

pub const PALETTE: [egui::Color32; 4] = [
    egui::Color32::from_rgb(0xB8, 0x5C, 0x39),
    egui::Color32::from_rgb(0x7A, 0x9E, 0x7E),
    egui::Color32::from_rgb(0xDE, 0xC4, 0xAD),
    egui::Color32::from_rgb(0xFF, 0xF8, 0xF3),
];

#[derive(Debug, Clone)]
struct Piece {
    /// Horizontal start as a fraction of the window width.
    x: f32,
    color: egui::Color32,
    round: bool,
    fall: Duration,
    /// Final rotation in degrees.
    rotation: f32,
}

/// Pieces falling from the top edge, each fading out over 2 to 4 seconds.
#[derive(Debug, Clone)]
pub struct Confetti {
    started: Instant,
    pieces: Vec<Piece>,
}

impl Confetti {
    pub fn launch(rng: &mut impl Rng, now: Instant) -> Self {
        let pieces = (0..PIECE_COUNT)
            .map(|_| Piece {
                x: rng.random::<f32>(),
                color: PALETTE[rng.random_range(0..PALETTE.len())],
                round: rng.random_bool(0.5),
                fall: Duration::from_millis(rng.random_range(2000..4000)),
                rotation: rng.random_range(0.0..360.0),
            })
            .collect();
        Self {
            started: now,
            pieces,
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.started);
        self.pieces.iter().all(|piece| elapsed >= piece.fall)
    }

    pub fn paint(&self, ctx: &egui::Context, now: Instant) {
        let screen = ctx.screen_rect();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("confetti"),
        ));
        let elapsed = now.saturating_duration_since(self.started).as_secs_f32();

        for piece in &self.pieces {
            let t = (elapsed / piece.fall.as_secs_f32()).clamp(0.0, 1.0);
            if t >= 1.0 {
                continue;
            }
            let eased = 1.0 - (1.0 - t) * (1.0 - t);
            let center = egui::pos2(
                screen.left() + piece.x * screen.width(),
                screen.top() - PIECE_SIZE + eased * (screen.height() + PIECE_SIZE),
            );
            let color = piece.color.gamma_multiply(1.0 - t);

            if piece.round {
                painter.circle_filled(center, PIECE_SIZE / 2.0, color);
            } else {
                let angle = (piece.rotation * eased).to_radians();
                let (sin, cos) = angle.sin_cos();
                let half = PIECE_SIZE / 2.0;
                let corners = [(-half, -half), (half, -half), (half, half), (-half, half)]
                    .iter()
                    .map(|(x, y)| center + egui::vec2(x * cos - y * sin, x * sin + y * cos))
                    .collect();
                painter.add(egui::Shape::convex_polygon(corners, color, egui::Stroke::NONE));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn launches_fifty_pieces_that_finish_within_four_seconds() {
        let mut rng = StdRng::seed_from_u64(7);
        let start = Instant::now();
        let confetti = Confetti::launch(&mut rng, start);

        assert_eq!(confetti.pieces.len(), PIECE_COUNT);
        assert!(!confetti.is_finished(start + Duration::from_millis(1999)));
        assert!(confetti.is_finished(start + Duration::from_secs(4)));
        assert!(confetti.pieces.iter().all(|p| PALETTE.contains(&p.color)));
    }
}
