//! Screen-space HUD: crosshair and stats text.

use renderer::OverlayTextBuilder;

use crate::hud::HudData;

const CROSSHAIR_SIZE: f32 = 32.0;
const CROSSHAIR_THICKNESS: f32 = 3.0;
const CROSSHAIR_COLOR: [f32; 4] = [0.2, 1.0, 0.5, 1.0];
const TEXT_SCALE: f32 = 2.0;
const TEXT_COLOR: [f32; 4] = [0.3, 0.45, 1.0, 1.0];
const TEXT_BG: [f32; 4] = [0.0, 0.0, 0.0, 0.45];
const TEXT_MARGIN: f32 = 30.0;
/// Rate line sits this far above the bottom edge.
const RATE_LINE_FROM_BOTTOM: f32 = 70.0;

/// Build the overlay for a `sw` x `sh` pixel surface.
pub fn build(hud: &HudData, sw: f32, sh: f32) -> OverlayTextBuilder {
    let mut tb = OverlayTextBuilder::new(sw, sh);
    tb.add_crosshair(sw * 0.5, sh * 0.5, CROSSHAIR_SIZE, CROSSHAIR_THICKNESS, CROSSHAIR_COLOR);
    tb.add_text_with_bg(TEXT_MARGIN, TEXT_MARGIN, &hud.player_line(), TEXT_SCALE, TEXT_COLOR, TEXT_BG);
    tb.add_text_with_bg(
        TEXT_MARGIN,
        sh - RATE_LINE_FROM_BOTTOM,
        &hud.rate_line(),
        TEXT_SCALE,
        TEXT_COLOR,
        TEXT_BG,
    );
    tb
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn overlay_has_crosshair_and_both_lines() {
        let hud = HudData {
            player_position: Vec3::ZERO,
            score: 0,
            frame_rate: 0.0,
            sample_frame: 0,
        };
        let tb = build(&hud, 800.0, 600.0);
        let glyphs = |s: String| s.chars().filter(|c| *c != ' ').count();
        // Two crosshair bars, two backgrounds, then the glyphs.
        let quads = 2 + 2 + glyphs(hud.player_line()) + glyphs(hud.rate_line());
        assert_eq!(tb.vertices.len(), quads * 4);
        assert_eq!(tb.indices.len(), quads * 6);
    }
}
