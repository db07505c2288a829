use super::*;

#[test]
fn test_defaults() {
  let settings = GeneratorSettings::default();
  assert!(!settings.fixed_map_size);
  assert_eq!(settings.num_chunks, IVec3::ONE);
  assert_eq!(settings.view_distance, 30.0);
  assert_eq!(settings.iso_level, 0.0);
  assert_eq!(settings.bounds_size, 1.0);
  assert_eq!(settings.points_per_axis, 30);
  assert!(settings.auto_update_in_editor && settings.auto_update_in_game);
  assert_eq!(settings.buffer_lifetime, BufferLifetime::Persistent);
  assert!(settings.validate().is_ok());
}

#[test]
fn test_point_spacing() {
  let settings = GeneratorSettings {
    bounds_size: 10.0,
    points_per_axis: 11,
    ..Default::default()
  };
  assert_eq!(settings.point_spacing(), 1.0);
  assert_eq!(settings.sample_params().dimensions, UVec3::splat(11));
}

#[test]
fn test_validate_rejects() {
  let base = GeneratorSettings::default();
  let cases = [
    (
      GeneratorSettings {
        points_per_axis: 1,
        ..base.clone()
      },
      SettingsError::PointsPerAxis(1),
    ),
    (
      GeneratorSettings {
        points_per_axis: 300,
        ..base.clone()
      },
      SettingsError::PointsPerAxis(300),
    ),
    (
      GeneratorSettings {
        bounds_size: 0.0,
        ..base.clone()
      },
      SettingsError::BoundsSize(0.0),
    ),
    (
      GeneratorSettings {
        view_distance: -1.0,
        ..base.clone()
      },
      SettingsError::ViewDistance(-1.0),
    ),
    (
      GeneratorSettings {
        view_distance: 100.0,
        bounds_size: 2.0,
        ..base.clone()
      },
      SettingsError::ViewRange {
        view_distance: 100.0,
        bounds_size: 2.0,
      },
    ),
    (
      GeneratorSettings {
        fixed_map_size: true,
        num_chunks: IVec3::new(2, 0, 2),
        ..base.clone()
      },
      SettingsError::ChunkCount([2, 0, 2]),
    ),
    (
      GeneratorSettings {
        density: DensitySettings {
          density_range: Some([1.0, -1.0]),
          ..Default::default()
        },
        ..base.clone()
      },
      SettingsError::DensityRange {
        min: 1.0,
        max: -1.0,
      },
    ),
  ];
  for (settings, expected) in cases {
    assert_eq!(settings.validate(), Err(expected));
  }

  let nan_iso = GeneratorSettings {
    iso_level: f32::NAN,
    ..base
  };
  assert!(matches!(nan_iso.validate(), Err(SettingsError::IsoLevel(_))));
}

#[test]
fn test_missing_sampler_fails_fast() {
  let density = DensitySettings::default();
  assert!(matches!(
    density.build_sampler(),
    Err(SettingsError::MissingSampler)
  ));
}

#[test]
fn test_build_sampler_applies_range() {
  let density = DensitySettings {
    shape: Some(DensityShape::Plane {
      normal: Vec3::Y,
      height: 0.0,
    }),
    density_range: Some([-2.0, 2.0]),
  };
  let sampler = density.build_sampler().unwrap();
  assert_eq!(sampler.sample(Vec3::new(0.0, 50.0, 0.0)), 2.0);
  assert_eq!(sampler.sample(Vec3::new(0.0, 1.0, 0.0)), 1.0);
}

#[test]
fn test_non_finite_density_range_is_rejected() {
  let settings: GeneratorSettings = toml::from_str(
    r#"
      [density]
      density_range = [nan, 1.0]

      [density.shape]
      kind = "sphere"
      radius = 6.0
    "#,
  )
  .unwrap();
  assert!(matches!(
    settings.validate(),
    Err(SettingsError::DensityRange { .. })
  ));
  assert!(matches!(
    settings.density.build_sampler(),
    Err(SettingsError::DensityRange { .. })
  ));

  for range in [[-1.0, f32::NAN], [f32::NEG_INFINITY, 0.0], [0.0, f32::INFINITY]] {
    let density = DensitySettings {
      density_range: Some(range),
      ..settings.density.clone()
    };
    assert!(
      matches!(density.checked_range(), Err(SettingsError::DensityRange { .. })),
      "{range:?}"
    );
    assert!(density.build_sampler().is_err());
  }
}

#[test]
fn test_allows_update() {
  let settings = GeneratorSettings {
    auto_update_in_editor: false,
    ..Default::default()
  };
  assert!(!settings.allows_update(UpdateContext::Interactive));
  assert!(settings.allows_update(UpdateContext::Simulation));
}

#[test]
fn test_streaming_mode() {
  let fixed = GeneratorSettings {
    fixed_map_size: true,
    num_chunks: IVec3::new(2, 1, 3),
    ..Default::default()
  };
  assert_eq!(
    fixed.streaming_mode(),
    StreamingMode::Fixed {
      num_chunks: IVec3::new(2, 1, 3)
    }
  );
  assert_eq!(
    GeneratorSettings::default().streaming_mode(),
    StreamingMode::Follow {
      view_distance: 30.0
    }
  );
}

#[test]
fn test_deserialize_partial_toml() {
  let settings: GeneratorSettings = toml::from_str(
    r#"
      fixed_map_size = true
      num_chunks = [3, 1, 3]
      bounds_size = 8.0
      buffer_lifetime = "release_after_dispatch"

      [density]
      density_range = [-10.0, 10.0]

      [density.shape]
      kind = "sphere"
      radius = 6.0
    "#,
  )
  .unwrap();

  assert!(settings.fixed_map_size);
  assert_eq!(settings.num_chunks, IVec3::new(3, 1, 3));
  assert_eq!(settings.points_per_axis, 30, "Unset fields keep defaults");
  assert_eq!(settings.buffer_lifetime, BufferLifetime::ReleaseAfterDispatch);
  assert!(settings.density.shape.is_some());
  assert!(settings.validate().is_ok());
}
