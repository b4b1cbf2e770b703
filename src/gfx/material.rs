/// Surface appearance of a mesh node
///
/// Only the state the selection indicator touches is modelled; shading is the
/// renderer's business.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
}

impl Material {
    pub fn new(base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            base_color,
            metallic,
            roughness,
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 1.0,
        }
    }

    /// Convenience constructor for opaque RGB colors
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new([r, g, b, 1.0], 0.0, 0.8)
    }

    /// Copy of this material glowing with `color`
    pub fn highlighted(&self, color: [f32; 3], intensity: f32) -> Self {
        Self {
            emissive: color,
            emissive_intensity: intensity,
            ..self.clone()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new([0.8, 0.8, 0.8, 1.0], 0.0, 0.5)
    }
}
