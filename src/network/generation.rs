//! Contact network generation
//!
//! Three topology families, each a pure function of its parameters and the
//! injected random source:
//! - scale-free: preferential attachment over a seed clique
//! - small-world: Watts-Strogatz ring lattice with random rewiring
//! - random: Erdos-Renyi independent edges

use ahash::AHashSet;
use rand::Rng;

use crate::core::config::NetworkParams;
use crate::core::error::Result;
use crate::core::types::Topology;
use crate::network::graph::Network;

/// Generate a network of exactly `population` people
pub fn generate<R: Rng + ?Sized>(
    topology: Topology,
    population: u32,
    params: &NetworkParams,
    rng: &mut R,
) -> Result<Network> {
    let edges = match topology {
        Topology::ScaleFree => scale_free_edges(population, params.attachment_count, rng),
        Topology::SmallWorld => small_world_edges(
            population,
            params.lattice_neighbors,
            params.rewire_probability,
            rng,
        ),
        Topology::Random => random_edges(population, params.edge_probability, rng),
    };

    tracing::debug!(
        "Generated {} network: {} people, {} connections",
        topology,
        population,
        edges.len()
    );

    Network::from_edges(population, &edges)
}

/// Preferential attachment with `m` edges per new node
pub fn scale_free_edges<R: Rng + ?Sized>(population: u32, m: u32, rng: &mut R) -> Vec<(u32, u32)> {
    let n = population as usize;
    let m = m as usize;
    let mut edges = Vec::new();
    let mut degrees = vec![0usize; n];

    // Seed clique of m + 1 nodes
    let seed = (m + 1).min(n);
    for i in 0..seed {
        for j in (i + 1)..seed {
            edges.push((i as u32, j as u32));
            degrees[i] += 1;
            degrees[j] += 1;
        }
    }

    let mut chosen: Vec<usize> = Vec::with_capacity(m);
    for i in seed..n {
        chosen.clear();
        let wanted = m.min(i);

        while chosen.len() < wanted {
            let target = match pick_by_degree(&degrees[..i], &chosen, rng) {
                Some(target) => target,
                // No degree mass left among the candidates
                None => pick_uniform_excluding(i, &chosen, rng),
            };
            chosen.push(target);
        }

        for &target in &chosen {
            edges.push((target as u32, i as u32));
            degrees[target] += 1;
            degrees[i] += 1;
        }
    }

    edges
}

/// Degree-weighted draw among nodes not in `exclude`
fn pick_by_degree<R: Rng + ?Sized>(degrees: &[usize], exclude: &[usize], rng: &mut R) -> Option<usize> {
    let total: usize = degrees
        .iter()
        .enumerate()
        .filter(|(j, _)| !exclude.contains(j))
        .map(|(_, d)| *d)
        .sum();
    if total == 0 {
        return None;
    }

    let roll = rng.gen_range(0..total);
    let mut cumulative = 0;
    for (j, &degree) in degrees.iter().enumerate() {
        if exclude.contains(&j) {
            continue;
        }
        cumulative += degree;
        if roll < cumulative {
            return Some(j);
        }
    }
    None
}

/// Uniform draw from `0..bound` minus `exclude`; `exclude` must leave a candidate
fn pick_uniform_excluding<R: Rng + ?Sized>(bound: usize, exclude: &[usize], rng: &mut R) -> usize {
    let candidates: Vec<usize> = (0..bound).filter(|j| !exclude.contains(j)).collect();
    candidates[rng.gen_range(0..candidates.len())]
}

/// Ring lattice of `k` nearest neighbors, each edge rewired with probability `p`
pub fn small_world_edges<R: Rng + ?Sized>(
    population: u32,
    k: u32,
    p: f64,
    rng: &mut R,
) -> Vec<(u32, u32)> {
    let n = population;
    let half = (k / 2).min(n.saturating_sub(1) / 2);
    let mut edges = Vec::with_capacity((n * half) as usize);
    let mut present: AHashSet<(u32, u32)> = AHashSet::with_capacity((n * half) as usize);
    let mut degrees = vec![0u32; n as usize];

    for i in 0..n {
        for j in 1..=half {
            let target = (i + j) % n;
            edges.push((i, target));
            present.insert(ordered(i, target));
            degrees[i as usize] += 1;
            degrees[target as usize] += 1;
        }
    }

    for edge in edges.iter_mut() {
        if rng.gen::<f64>() >= p {
            continue;
        }
        let (source, old_target) = *edge;

        // Already adjacent to everyone: nowhere to rewire to
        if degrees[source as usize] >= n - 1 {
            continue;
        }

        let new_target = loop {
            let candidate = rng.gen_range(0..n);
            if candidate != source && !present.contains(&ordered(source, candidate)) {
                break candidate;
            }
        };

        present.remove(&ordered(source, old_target));
        present.insert(ordered(source, new_target));
        degrees[old_target as usize] -= 1;
        degrees[new_target as usize] += 1;
        *edge = (source, new_target);
    }

    edges
}

/// Every unordered pair independently with probability `p`
pub fn random_edges<R: Rng + ?Sized>(population: u32, p: f64, rng: &mut R) -> Vec<(u32, u32)> {
    let mut edges = Vec::new();
    for i in 0..population {
        for j in (i + 1)..population {
            if rng.gen::<f64>() < p {
                edges.push((i, j));
            }
        }
    }
    edges
}

fn ordered(a: u32, b: u32) -> (u32, u32) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_scale_free_edge_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let edges = scale_free_edges(100, 4, &mut rng);
        // 5-clique (10 edges) + 95 nodes x 4 edges
        assert_eq!(edges.len(), 10 + 95 * 4);
    }

    #[test]
    fn test_scale_free_tiny_population() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(scale_free_edges(0, 4, &mut rng).is_empty());
        assert!(scale_free_edges(1, 4, &mut rng).is_empty());
        // Clique of 3
        assert_eq!(scale_free_edges(3, 4, &mut rng).len(), 3);
    }

    #[test]
    fn test_pick_by_degree_skips_excluded_and_zero_mass() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let degrees = [0, 5, 0, 2];
        for _ in 0..50 {
            let pick = pick_by_degree(&degrees, &[1], &mut rng);
            assert_eq!(pick, Some(3));
        }
        assert_eq!(pick_by_degree(&degrees, &[1, 3], &mut rng), None);
        assert_eq!(pick_uniform_excluding(2, &[1], &mut rng), 0);
    }

    #[test]
    fn test_small_world_without_rewiring_is_a_lattice() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let edges = small_world_edges(20, 8, 0.0, &mut rng);
        assert_eq!(edges.len(), 20 * 4);
        assert!(edges.contains(&(0, 4)));
        assert!(edges.contains(&(19, 3)));
    }

    #[test]
    fn test_small_world_keeps_edge_count_when_rewired() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let edges = small_world_edges(50, 8, 1.0, &mut rng);
        assert_eq!(edges.len(), 50 * 4);
        let unique: AHashSet<(u32, u32)> = edges.iter().map(|&(a, b)| ordered(a, b)).collect();
        assert_eq!(unique.len(), edges.len());
    }

    #[test]
    fn test_small_world_complete_graph_is_not_rewired() {
        // n = 5, k clamped to 4: complete graph, every rewire is skipped
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let edges = small_world_edges(5, 8, 1.0, &mut rng);
        assert_eq!(edges.len(), 10);
    }

    #[test]
    fn test_random_graph_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert!(random_edges(30, 0.0, &mut rng).is_empty());
        assert_eq!(random_edges(30, 1.0, &mut rng).len(), 30 * 29 / 2);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let params = NetworkParams::default();
        for topology in [Topology::ScaleFree, Topology::SmallWorld, Topology::Random] {
            let a = generate(topology, 80, &params, &mut ChaCha8Rng::seed_from_u64(77)).unwrap();
            let b = generate(topology, 80, &params, &mut ChaCha8Rng::seed_from_u64(77)).unwrap();
            assert_eq!(a.connections(), b.connections());
        }
    }
}
