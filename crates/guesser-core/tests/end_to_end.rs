use guesser_core::catalog::{self, Placemark};
use guesser_core::crop::{self, CropRegion, PatchSize};
use guesser_core::{project, select, Body, Game, GameEvent, GameState, PixelCoord, PlanetRegistry, RandomSource};

/// Random source that always draws the same index.
struct FixedDraw(usize);

impl RandomSource for FixedDraw {
    fn draw_index(&mut self, n: usize) -> usize {
        assert!(self.0 < n, "fixed draw {} outside [0, {n})", self.0);
        self.0
    }
}

fn three_feature_catalog() -> Vec<Placemark> {
    vec![
        Placemark::point("Olympus Mons", 18.65, 226.2),
        Placemark::point("Gale Crater", -5.4, 137.8),
        Placemark::point("Jezero Crater", 18.4, 77.5),
    ]
}

#[test]
fn gale_crater_round_is_reproducible() {
    let registry = PlanetRegistry::builtin();
    let mars = registry.get("mars").unwrap();
    assert_eq!((mars.map_width, mars.map_height), (1024, 512));

    let catalog = catalog::load(mars, &three_feature_catalog()).unwrap();
    assert_eq!(catalog.len(), 3);

    let run = || {
        let feature = select(catalog.features(), &mut FixedDraw(1), None).unwrap();
        let center = project(mars, feature.lat, feature.lon).unwrap();
        let region = crop::compute(mars, center, PatchSize::square(100)).unwrap();
        (feature.name.clone(), center, region)
    };

    let (name, center, region) = run();
    assert_eq!(name, "Gale Crater");
    assert_eq!(center, PixelCoord::new(392, 271));
    assert_eq!(region, CropRegion { left: 342, top: 221, right: 442, bottom: 321 });
    assert_eq!(run(), (name, center, region), "same inputs must give the same round");
}

#[test]
fn state_machine_reaches_same_round() {
    let registry = PlanetRegistry::builtin();
    let mars = registry.profile(Body::Mars).unwrap();
    let catalog = catalog::load(mars, &three_feature_catalog()).unwrap();
    let game = Game::new(mars, &catalog, PatchSize::square(100)).unwrap();

    let state = game
        .advance(&GameState::idle(), GameEvent::Start, &mut FixedDraw(1))
        .unwrap();
    match state {
        GameState::RoundActive { round, .. } => {
            assert_eq!(round.feature.name, "Gale Crater");
            assert_eq!(round.region, CropRegion { left: 342, top: 221, right: 442, bottom: 321 });
        }
        other => panic!("expected an active round, got {other:?}"),
    }
}
