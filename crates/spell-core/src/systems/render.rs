use crate::api::config::GameConfig;
use crate::renderer::instance::{RenderBuffer, RenderInstance};
use crate::systems::play::PlayField;

/// Build the render buffer from the play field: the player first, then the
/// falling letter if one is in flight.
pub fn build_render_buffer(field: &PlayField, config: &GameConfig, buffer: &mut RenderBuffer) {
    buffer.clear();

    let player = field.player_rect(config);
    buffer.push(RenderInstance {
        x: player.min.x,
        y: player.min.y,
        size: config.player_size,
        kind: RenderInstance::KIND_PLAYER,
        glyph: 0.0,
        alpha: 1.0,
        progress: 0.0,
        _pad: 0.0,
    });

    if let (Some(letter), Some(rect)) = (field.letter(), field.letter_rect(config)) {
        let travel = config.world_width + config.letter_size;
        buffer.push(RenderInstance {
            x: rect.min.x,
            y: rect.min.y,
            size: config.letter_size,
            kind: RenderInstance::KIND_LETTER,
            glyph: letter.ch as u32 as f32,
            alpha: 1.0,
            progress: ((config.world_width - letter.x) / travel).clamp(0.0, 1.0),
            _pad: 0.0,
        });
    }
}
