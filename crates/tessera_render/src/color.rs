use glam::Vec4;

/// Linear RGBA color with components in [0..1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    components: [f32; 4],
}

impl Color {
    /// Create a new Color from RGBA components in [0..1]
    pub const fn new(components: [f32; 4]) -> Self {
        Self { components }
    }

    /// Create an opaque color
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new([r, g, b, 1.0])
    }

    /// Get raw RGBA components
    pub fn components(&self) -> [f32; 4] {
        self.components
    }

    pub fn r(&self) -> f32 {
        self.components[0]
    }

    pub fn g(&self) -> f32 {
        self.components[1]
    }

    pub fn b(&self) -> f32 {
        self.components[2]
    }

    pub fn a(&self) -> f32 {
        self.components[3]
    }

    /// Overwrite all four components
    pub fn set(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.components = [r, g, b, a];
    }

    /// Same color with a different alpha
    pub fn with_alpha(self, a: f32) -> Self {
        let [r, g, b, _] = self.components;
        Self::new([r, g, b, a])
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0., 0., 0.);
    pub const WHITE: Color = Color::rgb(1., 1., 1.);
    pub const TRANSPARENT: Color = Color::new([0., 0., 0., 0.]);
    pub const RED: Color = Color::rgb(1., 0., 0.);
    pub const GREEN: Color = Color::rgb(0., 1., 0.);
    pub const BLUE: Color = Color::rgb(0., 0., 1.);
}

// Convert Color to wgpu::Color (f64 RGBA)
impl From<Color> for wgpu::Color {
    fn from(value: Color) -> Self {
        let [r, g, b, a] = value.components();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}

// Shader uniforms take colors as vec4
impl From<Color> for Vec4 {
    fn from(value: Color) -> Self {
        Vec4::from_array(value.components)
    }
}
