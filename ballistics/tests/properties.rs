use ballistics::{
    ArmorPlate, BallisticsConfig, CuboidWorld, ImpactOutcome, LayerMask, MaterialRegistry, Simulation,
    config::SpallConfig,
    penetration::{deflection_factor, energy_loss_ratio, ricochet_energy_loss_ratio},
    projectile::projectile_mass,
    spall::fragment_count,
};
use bevy_math::Vec3;
use proptest::prelude::*;
use std::f32::consts::FRAC_PI_4;

const PLATE_MATERIALS: [&str; 5] = ["RolledHomogeneousArmor", "Aluminium", "Alumina", "Wood", "Titanium"];
const SHELLS: [&str; 4] = ["AP_76mm", "HVAP_76mm", "AP_37mm", "Ball_12_7mm"];

proptest! {
    /// Property: fragment count is always within [0, max]
    #[test]
    fn prop_fragment_count_bounded(thickness in -1.0f32..5.0, diameter in -0.1f32..0.5) {
        let config = SpallConfig::default();
        let count = fragment_count(thickness, diameter, &config);
        prop_assert!(count <= config.max_fragments);
        if thickness <= 0.0 || diameter <= 0.0 {
            prop_assert_eq!(count, 0);
        }
    }

    /// Property: energy loss ratio stays in [0, 1]
    #[test]
    fn prop_energy_loss_in_unit_range(protection in 0.0f32..1.0e5, hp in 0.0f32..1.0e5) {
        let ratio = energy_loss_ratio(protection, hp, 1.3);
        prop_assert!((0.0..=1.0).contains(&ratio));
    }

    /// Property: ricochet loss stays in [0, 1]
    #[test]
    fn prop_ricochet_loss_in_unit_range(cos in 0.0f32..=1.0) {
        let ratio = ricochet_energy_loss_ratio(cos, 3.0);
        prop_assert!((0.0..=1.0).contains(&ratio));
    }

    /// Property: mass = (pi / 4) * d^2 * l * rho
    #[test]
    fn prop_mass_round_trip(d in 0.001f32..0.2, l in 0.001f32..1.0, rho in 500.0f32..20_000.0) {
        let mass = projectile_mass(d, l, rho);
        let expected = FRAC_PI_4 * d * d * l * rho;
        prop_assert!((mass - expected).abs() <= expected * 1e-5);
        prop_assert!(mass > 0.0);
    }

    /// Property: the deflection factor grows with obliquity
    #[test]
    fn prop_deflection_monotone_in_angle(speed in 100.0f32..1500.0, low in 0.0f32..1.0, extra in 0.0f32..5.0) {
        let materials = MaterialRegistry::builtin();
        let steel = materials.get(materials.lookup("HighCarbonSteel").expect("builtin"));
        let armor = materials.get(materials.lookup("RolledHomogeneousArmor").expect("builtin"));
        let a = deflection_factor(armor, steel, speed, 3.6e-4, low, 6.0e8);
        let b = deflection_factor(armor, steel, speed, 3.6e-4, low + extra, 6.0e8);
        prop_assert!(b >= a);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: every resolved impact obeys the hp, speed, thickness and outcome invariants
    #[test]
    fn prop_impacts_obey_invariants(
        seed in any::<u64>(),
        yaw in -0.6f32..0.6,
        pitch in -0.6f32..0.6,
        thickness in 0.001f32..0.4,
        material in 0..PLATE_MATERIALS.len(),
        shell in 0..SHELLS.len(),
    ) {
        let config = BallisticsConfig { gravity: Vec3::ZERO, ..BallisticsConfig::default() };
        let mut sim = Simulation::with_config(config).expect("simulation");
        let mut world = CuboidWorld::new();
        world.add_target(
            Vec3::new(0.0, 0.0, 6.0 + thickness / 2.0),
            Vec3::new(20.0, 20.0, thickness / 2.0),
            LayerMask::ARMOR,
            ArmorPlate::new(PLATE_MATERIALS[material]),
        );

        let direction = Vec3::new(yaw.sin(), pitch.sin(), 1.0);
        sim.create(Vec3::ZERO, direction, seed, SHELLS[shell]).expect("create");
        for _ in 0..6 {
            sim.tick(&mut world);
        }

        for event in sim.drain_impacts() {
            prop_assert!(event.hp_after <= event.hp_before);
            prop_assert!(event.hp_after >= 0.0);
            prop_assert!(event.velocity.length() <= event.incident_velocity.length() + 1e-3);
            prop_assert!(event.velocity.is_finite());
            prop_assert!(event.thickness >= 0.0);
            if event.deflection_factor > 1.0 {
                prop_assert_eq!(event.outcome, ImpactOutcome::Deflect);
            } else {
                prop_assert_ne!(event.outcome, ImpactOutcome::Deflect);
            }
        }
    }

    /// Property: a penetration near grazing incidence still travels into and through the plate
    #[test]
    fn prop_grazing_penetration_goes_through(
        seed in any::<u64>(),
        degrees in 60.0f32..89.5,
        thickness in 0.01f32..0.3,
        material in 0..PLATE_MATERIALS.len(),
        shell in 0..SHELLS.len(),
    ) {
        let config = BallisticsConfig { gravity: Vec3::ZERO, ..BallisticsConfig::default() };
        let mut sim = Simulation::with_config(config).expect("simulation");
        let mut world = CuboidWorld::new();
        world.add_target(
            Vec3::new(0.0, 0.0, 5.0 + thickness / 2.0),
            Vec3::new(40.0, 40.0, thickness / 2.0),
            LayerMask::ARMOR,
            ArmorPlate::new(PLATE_MATERIALS[material]),
        );

        let (sin, cos) = degrees.to_radians().sin_cos();
        let direction = Vec3::new(sin, 0.0, cos);
        sim.create(Vec3::new(0.0, 0.0, 5.0) - direction, direction, seed, SHELLS[shell]).expect("create");
        sim.tick(&mut world);

        for event in sim.drain_impacts() {
            if event.outcome == ImpactOutcome::Penetrate {
                prop_assert!(event.thickness > 0.0);
                prop_assert!(event.velocity.z > 0.0);
                prop_assert!(event.exit.z > 5.0 + thickness * 0.9);
            }
        }
    }
}
