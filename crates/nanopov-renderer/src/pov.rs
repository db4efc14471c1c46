//! POV-Ray 3.7 scene text.
//!
//! The writer walks a [`Scene`] once and streams it out block by block:
//! header, camera, lights, declarations, then the placed objects. Nested
//! blocks are indented with one tab per level.

use std::fmt::Display;
use std::io;

use nanopov_core::geometry::{HalfWidths, Point, ZExtent};
use nanopov_core::material::{SurfaceFinish, Texture};
use nanopov_core::{SceneObject, Solid, Vec3};

use crate::camera::{Camera, LightSource};
use crate::scene::{HeaderOptions, Scene};

pub const POV_VERSION: &str = "3.7";

/// Writes a [`Scene`] as POV-Ray scene text.
pub struct PovWriter<W: io::Write> {
    writer: W,
    depth: usize,
}

impl<W: io::Write> PovWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, depth: 0 }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write the whole scene.
    pub fn write(&mut self, scene: &Scene) -> io::Result<()> {
        self.write_header(&scene.header)?;
        self.write_camera(&scene.camera)?;
        for light in &scene.lights {
            self.write_light(light)?;
        }
        self.blank()?;

        for declaration in &scene.declarations {
            self.line(format_args!("#declare {} =", declaration.name))?;
            self.write_object(&declaration.object)?;
            self.blank()?;
        }

        for object in &scene.objects {
            self.write_object(object)?;
        }
        self.writer.flush()
    }

    fn write_header(&mut self, header: &HeaderOptions) -> io::Result<()> {
        self.line(format_args!("#version {};", POV_VERSION))?;
        self.line(format_args!(
            "global_settings {{ assumed_gamma {} }}",
            header.assumed_gamma
        ))?;
        self.line(format_args!(
            "background {{ color rgb {} }}",
            vector(&header.background)
        ))?;
        self.blank()
    }

    fn write_camera(&mut self, camera: &Camera) -> io::Result<()> {
        self.open("camera")?;
        match camera.angle {
            Some(angle) => self.line(format_args!("{} angle {}", camera.style, angle))?,
            None => self.line(&camera.style)?,
        }
        self.line(format_args!("location {}", vec3(camera.location)))?;
        self.line(format_args!("look_at {}", vec3(camera.look_at)))?;
        self.line(format_args!("up {}", vec3(camera.up)))?;
        self.line(format_args!("right {}", vec3(camera.right)))?;
        self.line(format_args!("sky {}", vec3(camera.sky)))?;
        self.close()
    }

    fn write_light(&mut self, light: &LightSource) -> io::Result<()> {
        self.open("light_source")?;
        self.line(vec3(light.position))?;
        self.line(format_args!("color rgb {}", vector(&light.color)))?;
        if light.shadowless {
            self.line("shadowless")?;
        }
        self.close()
    }

    fn write_object(&mut self, object: &SceneObject) -> io::Result<()> {
        self.write_solid(&object.solid, object.texture.as_ref())
    }

    fn write_solid(&mut self, solid: &Solid, texture: Option<&Texture>) -> io::Result<()> {
        match solid {
            Solid::Cylinder { center, z, radius } => {
                self.open("cylinder")?;
                self.line(format_args!(
                    "{}, {}, {}",
                    vec3(Vec3::new(center.x, center.y, z.top)),
                    vec3(Vec3::new(center.x, center.y, z.bottom)),
                    radius
                ))?;
            }
            Solid::EllipticCylinder {
                center,
                z,
                halfwidths,
                angle,
            } => {
                self.open("cylinder")?;
                self.line(format_args!(
                    "{}, {}, 1",
                    vec3(Vec3::new(0.0, 0.0, z.top)),
                    vec3(Vec3::new(0.0, 0.0, z.bottom))
                ))?;
                self.line(format_args!(
                    "scale {}",
                    vec3(Vec3::new(halfwidths.x, halfwidths.y, 1.0))
                ))?;
                self.placement(*center, *angle)?;
            }
            Solid::RectPrism {
                center,
                z,
                halfwidths,
                angle,
            } => {
                self.open("box")?;
                self.line(rect_corners(*halfwidths, *z))?;
                self.placement(*center, *angle)?;
            }
            Solid::Slab { min, max } => {
                self.open("box")?;
                self.line(format_args!("{}, {}", vec3(*min), vec3(*max)))?;
            }
            Solid::Difference { base, holes } => {
                self.open("difference")?;
                self.write_solid(base, None)?;
                for hole in holes {
                    self.write_solid(hole, None)?;
                }
            }
            Solid::Merge(objects) => {
                self.open("merge")?;
                for object in objects {
                    self.write_object(object)?;
                }
            }
            Solid::Reference(name) => {
                if texture.is_none() {
                    return self.line(format_args!("object {{ {} }}", name));
                }
                self.open("object")?;
                self.line(name)?;
            }
            Solid::Translate { solid, offset } => {
                if let (Solid::Reference(name), None) = (solid.as_ref(), texture) {
                    return self.line(format_args!(
                        "object {{ {} translate {} }}",
                        name,
                        vec3(*offset)
                    ));
                }
                self.open("object")?;
                self.write_solid(solid, None)?;
                self.line(format_args!("translate {}", vec3(*offset)))?;
            }
        }
        if let Some(texture) = texture {
            self.write_texture(texture)?;
        }
        self.close()
    }

    fn placement(&mut self, center: Point, angle: f64) -> io::Result<()> {
        self.line(format_args!("rotate {}", vec3(Vec3::new(0.0, 0.0, angle))))?;
        self.line(format_args!(
            "translate {}",
            vec3(Vec3::new(center.x, center.y, 0.0))
        ))
    }

    fn write_texture(&mut self, texture: &Texture) -> io::Result<()> {
        self.open("texture")?;
        self.line(format_args!(
            "pigment {{ color rgbft {} }}",
            vector(&texture.color.to_array())
        ))?;
        let mut interior = None;
        match &texture.finish {
            SurfaceFinish::Dull => {}
            SurfaceFinish::Preset { finish, ior } => {
                self.open("finish")?;
                for term in finish.terms() {
                    self.line(term)?;
                }
                self.close()?;
                interior = *ior;
            }
            SurfaceFinish::Custom(text) => {
                for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                    self.line(line)?;
                }
            }
        }
        self.close()?;
        if let Some(ior) = interior {
            self.line(format_args!("interior {{ ior {} }}", ior))?;
        }
        Ok(())
    }

    fn open(&mut self, keyword: &str) -> io::Result<()> {
        self.line(format_args!("{} {{", keyword))?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.line("}")
    }

    fn line(&mut self, text: impl Display) -> io::Result<()> {
        for _ in 0..self.depth {
            self.writer.write_all(b"\t")?;
        }
        writeln!(self.writer, "{}", text)
    }

    fn blank(&mut self) -> io::Result<()> {
        self.writer.write_all(b"\n")
    }
}

/// Render `scene` to a string.
pub fn to_pov_string(scene: &Scene) -> io::Result<String> {
    let mut writer = PovWriter::new(Vec::new());
    writer.write(scene)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn vec3(v: Vec3) -> String {
    vector(&v.to_array())
}

fn vector(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("<{}>", parts.join(", "))
}

fn rect_corners(half: HalfWidths, z: ZExtent) -> String {
    format!(
        "{}, {}",
        vec3(Vec3::new(-half.x, -half.y, z.top)),
        vec3(Vec3::new(half.x, half.y, z.bottom))
    )
}
