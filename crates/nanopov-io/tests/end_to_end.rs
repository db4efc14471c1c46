use nanopov_core::{ColorSpec, Finish, Point, Solid, SurfaceFinish};
use nanopov_io::{parse_device, write_pov, ProjectConfig};
use nanopov_renderer::guess_camera;

const SINGLE_CIRCLE: &str = r#"{
    "statepoint": {
        "num_layers": 1,
        "lattice_vecs": {"a": {"x": 4, "y": 0}, "b": {"x": 0, "y": 4}},
        "dev_layers": {
            "0": {
                "thickness": 2,
                "shapes": {
                    "0": {"material": "Si", "shape": "circle",
                          "shape_vars": {"center": {"x": 0, "y": 0}, "radius": 1}}
                }
            }
        },
        "sub_layer": {"thickness": 3}
    }
}"#;

fn single_tile_config() -> ProjectConfig {
    let mut config = ProjectConfig::default();
    config.build.num_uc_x = 1;
    config.build.num_uc_y = 1;
    config.build.finish = Finish::Glass;
    config
}

#[test]
fn test_single_circle_scene() {
    let device = parse_device(SINGLE_CIRCLE).unwrap();
    let config = single_tile_config();
    let mut out = Vec::new();
    let built = write_pov(&device, &config, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let objects = match &built.scene.declarations[0].object.solid {
        Solid::Merge(objects) => objects,
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(objects.len(), 2);

    match &objects[0].solid {
        Solid::Cylinder { center, z, radius } => {
            assert_eq!(*center, Point::new(0.0, 0.0));
            assert!(z.top.abs() < 1e-10);
            assert!((z.bottom + 2.0).abs() < 1e-10);
            assert!((radius - 1.0).abs() < 1e-10);
        }
        other => panic!("unexpected {other:?}"),
    }
    let si = objects[0].texture.as_ref().unwrap();
    assert_eq!(si.color, ColorSpec::rgbft(0.2, 0.2, 0.2, 0.0, 0.95));

    match &objects[1].solid {
        Solid::Slab { min, max } => {
            assert!((min.x + 2.0).abs() < 1e-10);
            assert!((min.y + 2.0).abs() < 1e-10);
            assert!((min.z + 2.0).abs() < 1e-10);
            assert!((max.x - 2.0).abs() < 1e-10);
            assert!((max.y - 2.0).abs() < 1e-10);
            assert!((max.z + 5.0).abs() < 1e-10);
        }
        other => panic!("unexpected {other:?}"),
    }
    let substrate = objects[1].texture.as_ref().unwrap();
    assert_eq!(substrate.color, ColorSpec::rgb(0.15, 0.15, 0.15));
    assert_eq!(substrate.finish, SurfaceFinish::Dull);

    let dims = built.scene.bounds;
    assert!((dims.x - 1.0).abs() < 1e-10);
    assert!((dims.y - 1.0).abs() < 1e-10);
    assert!((dims.z - 5.0).abs() < 1e-10);

    let mut scratch = nanopov_core::Diagnostics::new();
    let expected = guess_camera(
        &dims,
        [0.0; 3],
        &config.camera.style,
        config.camera.rotate,
        Point::default(),
        &mut scratch,
    );
    assert_eq!(built.scene.camera.location, expected.position);
    assert_eq!(built.scene.camera.look_at, expected.look_at);
    assert_eq!(built.scene.lights[0].position, expected.light);

    // Glass forces transmit 0.95 onto the Si color.
    assert_eq!(built.warning_count(), 1);

    assert!(text.starts_with("#version 3.7;\n"));
    assert!(text.contains("#declare UnitCell ="));
    assert!(text.contains("\t\t\tpigment { color rgbft <0.15, 0.15, 0.15, 0, 0> }"));
    assert_eq!(text.matches("object { UnitCell translate <0, 0, 0> }").count(), 1);
}

#[test]
fn test_missing_layer_writes_nothing() {
    let json = SINGLE_CIRCLE.replace(r#""num_layers": 1"#, r#""num_layers": 2"#);
    assert!(parse_device(&json).is_err());

    let mut device = parse_device(SINGLE_CIRCLE).unwrap();
    device.num_layers = 2;
    let mut out = Vec::new();
    assert!(write_pov(&device, &single_tile_config(), &mut out).is_err());
    assert!(out.is_empty());
}
