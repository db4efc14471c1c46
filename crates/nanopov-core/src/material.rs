use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticKind};

/// Material key of the substrate in the default color table.
pub const SUBSTRATE_MATERIAL: &str = "subst";

/// Color used when custom colors are requested but none were given (#00aaaa).
pub const DEFAULT_CUSTOM_COLOR: ColorSpec = ColorSpec::rgbft(0.0, 0.667, 0.667, 0.0, 0.0);

/// Shapes each layer is expected to hold when sizing the custom color list.
pub const SHAPES_PER_LAYER: usize = 3;

/// RGB plus filter and transmit, each nominally in `[0, 1]`.
///
/// Serialized as a `[r, g, b]` or `[r, g, b, filter, transmit]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ColorSpec {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub filter: f64,
    pub transmit: f64,
}

impl ColorSpec {
    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self {
            r,
            g,
            b,
            filter: 0.0,
            transmit: 0.0,
        }
    }

    pub const fn rgbft(r: f64, g: f64, b: f64, filter: f64, transmit: f64) -> Self {
        Self {
            r,
            g,
            b,
            filter,
            transmit,
        }
    }

    /// Build from a 3- or 5-element slice; anything else is rejected.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match values {
            [r, g, b] => Some(Self::rgb(*r, *g, *b)),
            [r, g, b, f, t] => Some(Self::rgbft(*r, *g, *b, *f, *t)),
            _ => None,
        }
    }

    pub fn to_array(&self) -> [f64; 5] {
        [self.r, self.g, self.b, self.filter, self.transmit]
    }
}

impl TryFrom<Vec<f64>> for ColorSpec {
    type Error = String;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        ColorSpec::from_slice(&values)
            .ok_or_else(|| format!("expected 3 or 5 color components, got {}", values.len()))
    }
}

impl From<ColorSpec> for Vec<f64> {
    fn from(color: ColorSpec) -> Self {
        color.to_array().to_vec()
    }
}

/// Fixed per-material colors used in default-color mode.
pub fn default_material_color(material: &str) -> Option<ColorSpec> {
    match material {
        SUBSTRATE_MATERIAL => Some(ColorSpec::rgb(0.15, 0.15, 0.15)),
        "Si" => Some(ColorSpec::rgb(0.2, 0.2, 0.2)),
        "SiO2" => Some(ColorSpec::rgb(0.99, 0.99, 0.96)),
        _ => None,
    }
}

/// Named finish presets. Unrecognized names read as [`Finish::Dull`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Finish {
    /// Pick the preset named after each shape's material.
    Material,
    Silicon,
    SiO2,
    Translucent,
    Glass,
    DullMetal,
    BrightMetal,
    Irid,
    Billiard,
    /// Use the caller's finish text verbatim.
    Custom,
    #[default]
    Dull,
}

impl Finish {
    pub fn parse(name: &str) -> Self {
        match name {
            "material" => Finish::Material,
            "Si" | "silicon" => Finish::Silicon,
            "SiO2" => Finish::SiO2,
            "translucent" => Finish::Translucent,
            "glass" => Finish::Glass,
            "dull_metal" => Finish::DullMetal,
            "bright_metal" => Finish::BrightMetal,
            "irid" => Finish::Irid,
            "billiard" => Finish::Billiard,
            "custom" => Finish::Custom,
            _ => Finish::Dull,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Finish::Material => "material",
            Finish::Silicon => "Si",
            Finish::SiO2 => "SiO2",
            Finish::Translucent => "translucent",
            Finish::Glass => "glass",
            Finish::DullMetal => "dull_metal",
            Finish::BrightMetal => "bright_metal",
            Finish::Irid => "irid",
            Finish::Billiard => "billiard",
            Finish::Custom => "custom",
            Finish::Dull => "dull",
        }
    }

    /// Replace [`Finish::Material`] with the preset named by `material`.
    pub fn for_material(self, material: &str) -> Self {
        match self {
            Finish::Material => match Finish::parse(material) {
                Finish::Material => Finish::Dull,
                resolved => resolved,
            },
            other => other,
        }
    }

    /// `(filter, transmit)` this preset forces onto every color it is applied to.
    pub fn forced_filter_transmit(&self) -> Option<(f64, f64)> {
        match self {
            Finish::SiO2 => Some((0.0, 0.98)),
            Finish::Translucent => Some((0.02, 0.50)),
            Finish::Glass => Some((0.0, 0.95)),
            Finish::Irid => Some((0.0, 0.7)),
            _ => None,
        }
    }

    /// Finish statements of the preset, in emission order.
    pub fn terms(&self) -> &'static [&'static str] {
        match self {
            Finish::Silicon => &[
                "diffuse 0.2",
                "brilliance 5",
                "phong 1",
                "phong_size 250",
                "roughness 0.01",
                "reflection <0.10, 0.10, 0.5> metallic",
                "metallic",
            ],
            Finish::SiO2 => &[
                "specular 0.6",
                "brilliance 5",
                "roughness 0.001",
                "reflection { 0.0, 1.0 fresnel on }",
            ],
            Finish::Translucent => &[
                "emission 0.25",
                "diffuse 0.75",
                "specular 0.4",
                "brilliance 4",
                "reflection { 0.5 fresnel on }",
            ],
            Finish::Glass => &[
                "specular 0.6",
                "phong 0.8",
                "brilliance 5",
                "reflection { 0.2, 1.0 fresnel on }",
            ],
            Finish::DullMetal => &[
                "emission 0.1",
                "diffuse 0.1",
                "specular 1.0",
                "roughness 0.001",
                "reflection 0.5 metallic",
                "metallic",
            ],
            Finish::BrightMetal => &[
                "emission 0.2",
                "diffuse 0.3",
                "specular 0.8",
                "roughness 0.01",
                "reflection 0.5 metallic",
                "metallic",
            ],
            Finish::Irid => &[
                "phong 0.5",
                "reflection { 0.2 metallic }",
                "diffuse 0.3",
                "irid { 0.75 thickness 0.5 turbulence 0.5 }",
            ],
            Finish::Billiard => &[
                "ambient 0.3",
                "diffuse 0.8",
                "specular 0.2",
                "roughness 0.005",
                "metallic 0.5",
            ],
            Finish::Material | Finish::Custom | Finish::Dull => &[],
        }
    }

    /// Interior index of refraction; `ior` is only used by the translucent preset.
    pub fn interior_ior(&self, ior: f64) -> Option<f64> {
        match self {
            Finish::Silicon => Some(4.24),
            Finish::SiO2 => Some(1.45),
            Finish::Translucent => Some(ior),
            Finish::Glass | Finish::Irid => Some(1.5),
            _ => None,
        }
    }
}

impl From<String> for Finish {
    fn from(name: String) -> Self {
        Finish::parse(&name)
    }
}

impl From<Finish> for String {
    fn from(finish: Finish) -> Self {
        finish.name().to_string()
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A finish after material resolution, ready to emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceFinish {
    /// No finish block.
    Dull,
    Preset { finish: Finish, ior: Option<f64> },
    Custom(String),
}

/// Pigment plus finish attached to an emitted solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Texture {
    pub color: ColorSpec,
    pub finish: SurfaceFinish,
}

impl Texture {
    /// The fixed dark grey, dull substrate texture.
    pub fn substrate() -> Self {
        Self {
            color: default_material_color(SUBSTRATE_MATERIAL).unwrap_or(DEFAULT_CUSTOM_COLOR),
            finish: SurfaceFinish::Dull,
        }
    }
}

/// Finish selection shared by every shape of a build.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishSelection {
    pub finish: Finish,
    pub custom_finish: String,
    pub ior: f64,
}

impl FinishSelection {
    /// Attach the finish for `material` to `color`. Presets that force
    /// filter/transmit overwrite the color and report it.
    pub fn apply(&self, material: &str, color: ColorSpec) -> (Texture, Option<Diagnostic>) {
        let finish = self.finish.for_material(material);
        let mut color = color;
        let mut diagnostic = None;

        if let Some((filter, transmit)) = finish.forced_filter_transmit() {
            if color.filter != filter || color.transmit != transmit {
                diagnostic = Some(Diagnostic::warning(
                    DiagnosticKind::ColorFinishOverride,
                    format!(
                        "finish '{}' overrides filter/transmit ({}, {}) with ({}, {})",
                        finish, color.filter, color.transmit, filter, transmit
                    ),
                ));
            }
            color.filter = filter;
            color.transmit = transmit;
        }

        let surface = match finish {
            Finish::Custom if !self.custom_finish.trim().is_empty() => {
                SurfaceFinish::Custom(self.custom_finish.clone())
            }
            Finish::Custom | Finish::Dull | Finish::Material => SurfaceFinish::Dull,
            preset => SurfaceFinish::Preset {
                finish: preset,
                ior: preset.interior_ior(self.ior),
            },
        };

        (
            Texture {
                color,
                finish: surface,
            },
            diagnostic,
        )
    }
}

/// Hands out one color per emitted shape.
///
/// In default mode the color comes from the material table and the cursor
/// never moves. In custom mode the caller's list is repeated until it holds
/// at least [`SHAPES_PER_LAYER`] entries per layer, and the cursor advances
/// after every shape.
#[derive(Debug, Clone)]
pub struct Palette {
    use_default_colors: bool,
    colors: Vec<ColorSpec>,
    cursor: usize,
}

impl Palette {
    pub fn new(use_default_colors: bool, custom_colors: &[ColorSpec], num_layers: usize) -> Self {
        let colors = if use_default_colors {
            Vec::new()
        } else {
            extend_custom_colors(custom_colors, num_layers)
        };
        Self {
            use_default_colors,
            colors,
            cursor: 0,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Color for the next emitted shape of `material`.
    pub fn next_color(&mut self, material: &str) -> (ColorSpec, Option<Diagnostic>) {
        if self.use_default_colors {
            return match default_material_color(material) {
                Some(color) => (color, None),
                None => (
                    DEFAULT_CUSTOM_COLOR,
                    Some(Diagnostic::warning(
                        DiagnosticKind::UnknownMaterial,
                        format!("no default color for material '{material}'"),
                    )),
                ),
            };
        }

        let color = self.colors[self.cursor % self.colors.len()];
        self.cursor += 1;
        (color, None)
    }
}

/// Repeat `custom` in order until it holds at least `SHAPES_PER_LAYER * num_layers` colors.
pub fn extend_custom_colors(custom: &[ColorSpec], num_layers: usize) -> Vec<ColorSpec> {
    let base: Vec<ColorSpec> = if custom.is_empty() {
        vec![DEFAULT_CUSTOM_COLOR]
    } else {
        custom.to_vec()
    };
    let target = SHAPES_PER_LAYER.saturating_mul(num_layers);
    let mut colors = base.clone();
    while colors.len() < target {
        colors.extend_from_slice(&base);
    }
    colors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(finish: Finish) -> FinishSelection {
        FinishSelection {
            finish,
            custom_finish: String::new(),
            ior: 1.0,
        }
    }

    #[test]
    fn test_extend_custom_colors() {
        let red = ColorSpec::rgb(1.0, 0.0, 0.0);
        let blue = ColorSpec::rgb(0.0, 0.0, 1.0);
        let colors = extend_custom_colors(&[red, blue], 4);
        assert!(colors.len() >= 12);
        for (i, c) in colors.iter().enumerate() {
            assert_eq!(*c, if i % 2 == 0 { red } else { blue });
        }
    }

    #[test]
    fn test_extend_keeps_long_lists() {
        let list = vec![ColorSpec::rgb(0.1, 0.2, 0.3); 7];
        assert_eq!(extend_custom_colors(&list, 1).len(), 7);
    }

    #[test]
    fn test_extend_empty_uses_default() {
        let colors = extend_custom_colors(&[], 1);
        assert_eq!(colors, vec![DEFAULT_CUSTOM_COLOR; 3]);
    }

    #[test]
    fn test_palette_default_mode_does_not_advance() {
        let mut palette = Palette::new(true, &[], 2);
        let (si, diag) = palette.next_color("Si");
        assert_eq!(si, ColorSpec::rgb(0.2, 0.2, 0.2));
        assert!(diag.is_none());
        assert_eq!(palette.cursor(), 0);

        let (fallback, diag) = palette.next_color("GaAs");
        assert_eq!(fallback, DEFAULT_CUSTOM_COLOR);
        assert_eq!(diag.unwrap().kind, DiagnosticKind::UnknownMaterial);
    }

    #[test]
    fn test_palette_custom_mode_cycles() {
        let a = ColorSpec::rgb(1.0, 0.0, 0.0);
        let b = ColorSpec::rgb(0.0, 1.0, 0.0);
        let mut palette = Palette::new(false, &[a, b], 1);
        let picked: Vec<ColorSpec> = (0..5).map(|_| palette.next_color("Si").0).collect();
        assert_eq!(picked, vec![a, b, a, b, a]);
        assert_eq!(palette.cursor(), 5);
    }

    #[test]
    fn test_finish_parse_and_material() {
        assert_eq!(Finish::parse("silicon"), Finish::Silicon);
        assert_eq!(Finish::parse(""), Finish::Dull);
        assert_eq!(Finish::parse("chrome"), Finish::Dull);
        assert_eq!(Finish::Material.for_material("SiO2"), Finish::SiO2);
        assert_eq!(Finish::Material.for_material("subst"), Finish::Dull);
        assert_eq!(Finish::Material.for_material("material"), Finish::Dull);
        assert_eq!(Finish::Glass.for_material("Si"), Finish::Glass);
    }

    #[test]
    fn test_override_finishes_force_filter_transmit() {
        let custom = ColorSpec::rgbft(0.3, 0.4, 0.5, 0.11, 0.22);
        for finish in [Finish::SiO2, Finish::Translucent, Finish::Glass, Finish::Irid] {
            let (texture, diag) = selection(finish).apply("Si", custom);
            let (filter, transmit) = finish.forced_filter_transmit().unwrap();
            assert_eq!(texture.color.filter, filter);
            assert_eq!(texture.color.transmit, transmit);
            assert_eq!((texture.color.r, texture.color.g, texture.color.b), (0.3, 0.4, 0.5));
            assert_eq!(diag.unwrap().kind, DiagnosticKind::ColorFinishOverride);
        }
    }

    #[test]
    fn test_material_finish_overrides_for_oxide() {
        let white = ColorSpec::rgb(1.0, 1.0, 1.0);
        let (texture, diag) = selection(Finish::Material).apply("SiO2", white);
        assert_eq!(texture.color.transmit, 0.98);
        assert!(diag.is_some());
        assert_eq!(
            texture.finish,
            SurfaceFinish::Preset {
                finish: Finish::SiO2,
                ior: Some(1.45)
            }
        );
    }

    #[test]
    fn test_matching_filter_transmit_is_not_an_override() {
        let already_glass = ColorSpec::rgbft(0.3, 0.4, 0.5, 0.0, 0.95);
        let (texture, diag) = selection(Finish::Glass).apply("Si", already_glass);
        assert_eq!(texture.color, already_glass);
        assert!(diag.is_none());

        let nearly_glass = ColorSpec::rgbft(0.3, 0.4, 0.5, 0.0, 0.9);
        let (_, diag) = selection(Finish::Glass).apply("Si", nearly_glass);
        assert!(diag.is_some());
    }

    #[test]
    fn test_non_override_finish_keeps_color() {
        let color = ColorSpec::rgbft(0.3, 0.4, 0.5, 0.11, 0.22);
        let (texture, diag) = selection(Finish::Billiard).apply("Si", color);
        assert_eq!(texture.color, color);
        assert!(diag.is_none());
    }

    #[test]
    fn test_custom_finish() {
        let mut sel = selection(Finish::Custom);
        let (texture, _) = sel.apply("Si", DEFAULT_CUSTOM_COLOR);
        assert_eq!(texture.finish, SurfaceFinish::Dull);

        sel.custom_finish = "finish { phong 0.9 }".into();
        let (texture, _) = sel.apply("Si", DEFAULT_CUSTOM_COLOR);
        assert_eq!(texture.finish, SurfaceFinish::Custom("finish { phong 0.9 }".into()));
    }

    #[test]
    fn test_translucent_uses_requested_ior() {
        let mut sel = selection(Finish::Translucent);
        sel.ior = 1.33;
        let (texture, _) = sel.apply("Si", DEFAULT_CUSTOM_COLOR);
        assert_eq!(
            texture.finish,
            SurfaceFinish::Preset {
                finish: Finish::Translucent,
                ior: Some(1.33)
            }
        );
    }

    #[test]
    fn test_color_from_slice() {
        assert_eq!(ColorSpec::from_slice(&[0.1, 0.2, 0.3]), Some(ColorSpec::rgb(0.1, 0.2, 0.3)));
        assert_eq!(
            ColorSpec::from_slice(&[0.1, 0.2, 0.3, 0.4, 0.5]).map(|c| c.to_array()),
            Some([0.1, 0.2, 0.3, 0.4, 0.5])
        );
        assert!(ColorSpec::from_slice(&[0.1, 0.2]).is_none());
    }

    #[test]
    fn test_color_serde_as_array() {
        let color: ColorSpec = serde_json::from_str("[0.5, 0.25, 1.0]").unwrap();
        assert_eq!(color, ColorSpec::rgb(0.5, 0.25, 1.0));
        let json = serde_json::to_string(&ColorSpec::rgbft(1.0, 0.0, 0.0, 0.5, 0.25)).unwrap();
        assert_eq!(json, "[1.0,0.0,0.0,0.5,0.25]");
        assert!(serde_json::from_str::<ColorSpec>("[1.0]").is_err());
    }

    #[test]
    fn test_substrate_texture() {
        let t = Texture::substrate();
        assert_eq!(t.color, ColorSpec::rgb(0.15, 0.15, 0.15));
        assert_eq!(t.finish, SurfaceFinish::Dull);
    }
}
