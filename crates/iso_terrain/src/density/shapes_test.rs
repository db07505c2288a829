use super::*;

#[test]
fn test_sphere_sign() {
  let sphere = DensityShape::Sphere {
    radius: 2.0,
    center: Vec3::ONE,
  }
  .build()
  .unwrap();
  assert!(sphere.density(Vec3::ONE) < 0.0);
  assert!((sphere.density(Vec3::new(3.0, 1.0, 1.0))).abs() < 1e-6);
  assert!(sphere.density(Vec3::splat(10.0)) > 0.0);
}

#[test]
fn test_plane_normalizes() {
  let plane = DensityShape::Plane {
    normal: Vec3::new(0.0, 4.0, 0.0),
    height: 1.0,
  }
  .build()
  .unwrap();
  assert_eq!(plane.density(Vec3::new(5.0, 3.0, -2.0)), 2.0);
  assert!(plane.density(Vec3::ZERO) < 0.0);
}

#[test]
fn test_cuboid_distance() {
  let cuboid = DensityShape::Cuboid {
    half_extents: Vec3::new(1.0, 2.0, 3.0),
    center: Vec3::ZERO,
  }
  .build()
  .unwrap();
  assert_eq!(cuboid.density(Vec3::ZERO), -1.0);
  assert_eq!(cuboid.density(Vec3::new(3.0, 0.0, 0.0)), 2.0);
  assert!((cuboid.density(Vec3::new(2.0, 3.0, 0.0)) - 2f32.sqrt()).abs() < 1e-6);
}

#[test]
fn test_noise_is_deterministic_per_seed() {
  let shape = DensityShape::Noise {
    seed: 7,
    frequency: 0.1,
    octaves: 3,
    amplitude: 4.0,
    ground_level: 0.0,
  };
  let a = shape.build().unwrap();
  let b = shape.build().unwrap();
  let p = Vec3::new(1.3, 0.2, -7.9);
  assert_eq!(a.density(p), b.density(p));

  // Far above the displaced ground is always outside
  assert!(a.density(Vec3::new(0.0, 100.0, 0.0)) > 0.0);
  assert!(a.density(Vec3::new(0.0, -100.0, 0.0)) < 0.0);
}

#[test]
fn test_invalid_shapes_rejected() {
  let bad = [
    DensityShape::Sphere {
      radius: 0.0,
      center: Vec3::ZERO,
    },
    DensityShape::Plane {
      normal: Vec3::ZERO,
      height: 0.0,
    },
    DensityShape::Cuboid {
      half_extents: Vec3::new(1.0, -1.0, 1.0),
      center: Vec3::ZERO,
    },
    DensityShape::Noise {
      seed: 0,
      frequency: 0.1,
      octaves: 0,
      amplitude: 1.0,
      ground_level: 0.0,
    },
  ];
  for shape in bad {
    assert!(
      matches!(shape.build(), Err(SettingsError::Shape(_))),
      "{:?} should be rejected",
      shape
    );
  }
}

#[test]
fn test_deserialize_tagged() {
  let shape: DensityShape = toml::from_str(
    r#"
      kind = "sphere"
      radius = 3.5
    "#,
  )
  .unwrap();
  assert_eq!(
    shape,
    DensityShape::Sphere {
      radius: 3.5,
      center: Vec3::ZERO
    }
  );

  let noise: DensityShape = toml::from_str(r#"kind = "noise""#).unwrap();
  assert!(matches!(noise, DensityShape::Noise { octaves: 4, .. }));
}
