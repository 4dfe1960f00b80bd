use infinibuy_core::{MarketSnapshot, OrderPlanEngine};
use infinibuy_runner::{price_grid, sweep_prices, SweepRow};
use proptest::prelude::*;

proptest! {
    #[test]
    fn grid_stays_within_bounds(from in 1.0f64..500.0, span in 0.0f64..500.0, step in 0.01f64..50.0) {
        let to = from + span;
        let grid = price_grid(from, to, step);
        prop_assert!(!grid.is_empty());
        prop_assert_eq!(grid[0], from);
        for pair in grid.windows(2) {
            prop_assert!(pair[1] > pair[0]);
        }
        prop_assert!(*grid.last().unwrap() <= to + 1e-6);
    }

    #[test]
    fn parallel_sweep_matches_sequential(
        avg in 1.0f64..200.0,
        holdings in 0u64..100,
        from in 1.0f64..100.0,
    ) {
        let engine = OrderPlanEngine::default();
        let snapshot = MarketSnapshot::new(avg, avg, holdings);
        let prices = price_grid(from, from + 50.0, 5.0);

        let parallel = sweep_prices(&engine, &snapshot, &prices);
        let sequential: Vec<SweepRow> = prices
            .iter()
            .map(|&p| SweepRow::from_plan(&engine.evaluate(&snapshot.with_price(p))))
            .collect();
        prop_assert_eq!(parallel, sequential);
    }

    #[test]
    fn sweep_ladder_cost_is_bounded(price in 0.5f64..1000.0) {
        let engine = OrderPlanEngine::default();
        let rows = sweep_prices(&engine, &MarketSnapshot::flat(price), &[price]);
        let budget = engine.per_round_budget();
        for row in rows {
            // every ladder line individually respects the budget
            prop_assert!(row.ladder_cost <= budget * 4.0 + 1e-6);
            prop_assert!(row.aggressive_price <= price * 1.15 + 1e-9);
        }
    }
}
