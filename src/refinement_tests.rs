#[cfg(test)]
mod tests {
    use crate::generators::{barbell, random_partition, two_triangles};
    use crate::graph::Graph;
    use crate::modularity::{Assignment, ModularityMatrix};
    use crate::refine::{
        optimal_assignment, top_gain_subset, ExactSubsetSolver, SingleLevelRefinement, StopReason,
        Subproblem, SubproblemSolver, SubsetMethod,
    };
    use crate::{RefinementConfig, Result, RunArtifact};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const METHODS: [SubsetMethod; 3] = [SubsetMethod::Spectral, SubsetMethod::Bfs, SubsetMethod::TopGain];

    /// Greedy single-flip local search; stands in for an external heuristic oracle.
    struct GreedyFlip;

    impl SubproblemSolver for GreedyFlip {
        fn solve(&self, problem: &Subproblem) -> Result<Vec<i8>> {
            let k = problem.len();
            let mut s = Assignment::uniform(k, false);
            let mut score = problem.objective(&s)?;
            loop {
                let mut improved = false;
                for v in 0..k {
                    let cand = s.flipped(v);
                    let q = problem.objective(&cand)?;
                    if q > score {
                        s = cand;
                        score = q;
                        improved = true;
                    }
                }
                if !improved {
                    break;
                }
            }
            // Report in the {0, 1} encoding to exercise the normalization path.
            Ok(s.as_slice().iter().map(|&x| if x > 0 { 1 } else { 0 }).collect())
        }

        fn name(&self) -> &str {
            "greedy_flip"
        }
    }

    fn graph_from_mask(n: usize, mask: &[bool]) -> Graph {
        let mut edges = Vec::new();
        let mut idx = 0;
        for i in 0..n {
            for j in i + 1..n {
                if mask[idx] {
                    edges.push((i, j));
                }
                idx += 1;
            }
        }
        Graph::from_unweighted_edges(n, &edges).unwrap()
    }

    #[test]
    fn test_two_triangle_exact_scenario() {
        let bench = two_triangles().unwrap();
        let model = ModularityMatrix::from_graph(&bench.graph).unwrap();
        let (score, s) = optimal_assignment(&model).unwrap();
        let planted = bench.solution.unwrap();
        assert!(s == planted || s == planted.negated());
        assert!((score - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_top_gain_covers_graph_when_large() {
        for gains in [vec![3.0, -1.0, 0.0, 7.0], vec![-9.0; 4], vec![0.5, 0.25, 1e9, -1e9]] {
            let subset = top_gain_subset(&gains, 4);
            assert_eq!(subset, vec![0, 1, 2, 3]);
            assert_eq!(top_gain_subset(&gains, 100), vec![0, 1, 2, 3]);
        }
    }

    #[test]
    fn test_barbell_recovered_with_reference() {
        let bench = barbell(6).unwrap();
        let model = ModularityMatrix::from_graph(&bench.graph).unwrap();
        let config = RefinementConfig::new()
            .with_iter_size(12)
            .with_reference_assignment(&model, bench.solution.as_ref().unwrap())
            .unwrap();
        let out = SingleLevelRefinement::new(config).unwrap().run(&bench.graph).unwrap();
        assert_eq!(out.stop_reason, StopReason::ReachedReference);
        let planted = bench.solution.unwrap();
        assert!(out.best_assignment == planted || out.best_assignment == planted.negated());
    }

    #[test]
    fn test_refinement_improves_on_planted_partition() {
        let bench = random_partition(10, 10, 0.9, 0.05, 11).unwrap();
        let model = ModularityMatrix::from_graph(&bench.graph).unwrap();
        for method in METHODS {
            let config = RefinementConfig::new()
                .with_seed(3)
                .with_iter_size(6)
                .with_subset_method(method);
            let out = SingleLevelRefinement::new(config).unwrap().run(&bench.graph).unwrap();
            let mut rng = StdRng::seed_from_u64(3);
            let initial = model.evaluate(&Assignment::random(20, &mut rng)).unwrap();
            assert!(out.best_modularity >= initial, "{method}");
            assert!(out.iterations <= 20 + 3);
        }
    }

    #[test]
    fn test_external_oracle_substitution() {
        let bench = barbell(5).unwrap();
        let config = RefinementConfig::new().with_iter_size(4).with_subset_method(SubsetMethod::Bfs);
        let run = SingleLevelRefinement::new(config.clone()).unwrap();
        let out = run.run_with_solver(&bench.graph, &GreedyFlip).unwrap();
        let model = ModularityMatrix::from_graph(&bench.graph).unwrap();
        assert!((model.evaluate(&out.best_assignment).unwrap() - out.best_modularity).abs() < 1e-9);

        let artifact = RunArtifact::new(out, &config, &bench.graph, Some(bench.name), GreedyFlip.name());
        assert_eq!(artifact.solver, "greedy_flip");
        assert_eq!(artifact.subset_method, SubsetMethod::Bfs);
    }

    #[test]
    fn test_boxed_solver() {
        let bench = two_triangles().unwrap();
        let solver: Box<dyn SubproblemSolver> = Box::new(ExactSubsetSolver::new());
        let out = SingleLevelRefinement::new(RefinementConfig::new())
            .unwrap()
            .run_with_solver(&bench.graph, &solver)
            .unwrap();
        assert!((out.best_modularity - 10.0).abs() < 1e-10);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn refinement_invariants(
            n in 3usize..13,
            mask in proptest::collection::vec(any::<bool>(), 78),
            iter_size in 1usize..6,
            stopping in 0usize..4,
            method_idx in 0usize..3,
            seed in any::<u64>(),
        ) {
            let graph = graph_from_mask(n, &mask);
            let config = RefinementConfig::new()
                .with_seed(seed)
                .with_iter_size(iter_size)
                .with_stopping_criteria(stopping)
                .with_subset_method(METHODS[method_idx]);
            let run = SingleLevelRefinement::new(config).unwrap();

            let first = run.run(&graph).unwrap();
            let second = run.run(&graph).unwrap();
            prop_assert_eq!(&first, &second);

            // Termination bound.
            prop_assert!(first.iterations <= n + stopping);
            prop_assert_eq!(first.history.len(), first.iterations);

            // Best never regresses.
            for pair in first.history.windows(2) {
                prop_assert!(pair[1].best_modularity >= pair[0].best_modularity);
            }

            let model = ModularityMatrix::from_graph(&graph).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let initial = model.evaluate(&Assignment::random(n, &mut rng)).unwrap();
            prop_assert!(first.best_modularity >= initial);
            prop_assert!(first.history.iter().all(|r| r.best_modularity >= initial));

            let rescored = model.evaluate(&first.best_assignment).unwrap();
            prop_assert!((rescored - first.best_modularity).abs() < 1e-9);

            let (optimum, _) = optimal_assignment(&model).unwrap();
            prop_assert!(first.best_modularity <= optimum + 1e-9);
        }
    }
}
