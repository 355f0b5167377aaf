use bytemuck::{Pod, Zeroable};

/// Per-sprite render data read by the presentation layer from WASM memory.
/// 8 floats = 32 bytes stride. Positions are top-left corners in world units.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// Left edge in world space.
    pub x: f32,
    /// Top edge in world space.
    pub y: f32,
    /// Side length of the square sprite.
    pub size: f32,
    /// Sprite kind (`KIND_PLAYER` or `KIND_LETTER`).
    pub kind: f32,
    /// Character code drawn on a letter sprite (0 for the player).
    pub glyph: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// Fraction of the letter's travel completed (0.0 at spawn).
    pub progress: f32,
    pub _pad: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub const KIND_PLAYER: f32 = 0.0;
    pub const KIND_LETTER: f32 = 1.0;
}

/// Sprites for the current frame.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self { instances: Vec::with_capacity(2) }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for reads from JS.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }

    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.instances)
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
