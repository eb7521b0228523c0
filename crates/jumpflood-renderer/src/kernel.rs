//! The jump flood step kernel.
//!
//! Every output texel is a pure function of the read target; rows of the
//! write target are produced in parallel.

use jumpflood_core::SeedTexel;
use rayon::prelude::*;

use crate::error::RenderError;
use crate::finalize::finalize_texel;
use crate::program::{KernelProgram, ProgramKind};
use crate::target::RenderTarget;
use crate::viewport::Viewport;

/// Sampling window, centre first so a texel only changes when a neighbour
/// offers a strictly closer seed.
const WINDOW: [(i64, i64); 9] = [
    (0, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Offset in pixels sampled at `level` (1-based): `2^(num_steps - level)`,
/// halving from half the grid down to one pixel.
pub fn step_width(level: u32, num_steps: u32) -> i64 {
    let level = level.clamp(1, num_steps.max(1));
    1i64 << (num_steps.max(1) - level)
}

/// Nearest-seed candidate for pixel `(x, y)` among the 3x3 window spaced
/// `step_width` apart. Distances are measured to this pixel's own texture
/// coordinate.
pub fn step_texel(source: &RenderTarget, x: u32, y: u32, level: u32, num_steps: u32) -> SeedTexel {
    let texcoord = Viewport::new(source.width(), source.height()).texcoord(x, y);
    let width = step_width(level, num_steps);

    let mut nearest: Option<(f32, SeedTexel)> = None;
    for (dx, dy) in WINDOW {
        let sample = source.sample_clamped(x as i64 + dx * width, y as i64 + dy * width);
        let candidate = SeedTexel::from_channels(sample);
        if !candidate.is_valid() {
            continue;
        }
        let dist = candidate.nearest_seed.distance_to(texcoord);
        if nearest.map_or(true, |(best, _)| dist < best) {
            nearest = Some((dist, candidate));
        }
    }

    match nearest {
        Some((_, seed)) => SeedTexel::seed(seed.nearest_seed, seed.encoded_color),
        None => SeedTexel::EMPTY,
    }
}

/// Runs the jump flood program over every pixel of `target`, reading only
/// from `source`. Level `num_steps + 1` selects the distance transform.
pub fn run_pass(
    program: &KernelProgram,
    source: &RenderTarget,
    target: &mut RenderTarget,
    level: u32,
) -> Result<(), RenderError> {
    program.expect_kind(ProgramKind::JumpFlood)?;
    if (source.width(), source.height()) != (target.width(), target.height()) {
        return Err(RenderError::Resource {
            width: target.width(),
            height: target.height(),
            reason: format!(
                "pass reads a {}x{} target",
                source.width(),
                source.height()
            ),
        });
    }

    let num_steps = program.num_steps();
    let finalize = level == num_steps + 1;
    let row_len = target.width() as usize;

    target
        .texels_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let (x, y) = (x as u32, y as u32);
                *out = if finalize {
                    finalize_texel(source, x, y)
                } else {
                    step_texel(source, x, y, level, num_steps).to_channels()
                };
            }
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{RenderDevice, SoftwareDevice};
    use crate::pingpong::PingPongBuffers;
    use crate::program::{KernelSource, ProgramSet};
    use jumpflood_core::sequencer::num_steps_for;
    use jumpflood_core::{encode_color, Vec2, Vec3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstar::RTree;

    fn buffers_with_seeds(
        device: &mut SoftwareDevice,
        w: u32,
        h: u32,
        seeds: &[(u32, u32)],
    ) -> PingPongBuffers {
        let mut buffers = PingPongBuffers::allocate(device, w, h).unwrap();
        let vp = Viewport::new(w, h);
        for (i, &(x, y)) in seeds.iter().enumerate() {
            let color = Vec3::new((i % 10) as f32 / 10.0, 0.5, 0.3);
            let seed = SeedTexel::seed(vp.texcoord(x, y), encode_color(color));
            buffers.current_mut().set_texel(x, y, seed.to_channels());
        }
        buffers
    }

    fn propagate(program: &KernelProgram, buffers: &mut PingPongBuffers, levels: impl Iterator<Item = u32>) {
        for level in levels {
            let (read, write) = buffers.split();
            run_pass(program, read, write, level).unwrap();
            buffers.swap();
        }
    }

    fn oracle(w: u32, h: u32, seeds: &[(u32, u32)]) -> RTree<[f64; 2]> {
        let vp = Viewport::new(w, h);
        let points = seeds
            .iter()
            .map(|&(x, y)| {
                let t = vp.texcoord(x, y);
                [t.x as f64, t.y as f64]
            })
            .collect();
        RTree::bulk_load(points)
    }

    fn exact_distance(tree: &RTree<[f64; 2]>, p: Vec2) -> f64 {
        let q = [p.x as f64, p.y as f64];
        let n = tree.nearest_neighbor(&q).unwrap();
        ((n[0] - q[0]).powi(2) + (n[1] - q[1]).powi(2)).sqrt()
    }

    #[test]
    fn test_step_width_halves_to_one() {
        assert_eq!(step_width(1, 4), 8);
        assert_eq!(step_width(2, 4), 4);
        assert_eq!(step_width(4, 4), 1);
        assert_eq!(step_width(0, 4), 8);
        assert_eq!(step_width(9, 4), 1);
    }

    #[test]
    fn test_empty_grid_stays_empty() {
        let mut device = SoftwareDevice::new(256);
        let programs = ProgramSet::compile(&mut device, 4).unwrap();
        let mut buffers = buffers_with_seeds(&mut device, 16, 16, &[]);
        propagate(&programs.jump_flood, &mut buffers, 1..=4);
        assert!(buffers
            .current()
            .texels()
            .iter()
            .all(|t| !SeedTexel::from_channels(*t).is_valid()));
    }

    #[test]
    fn test_converges_to_brute_force() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for trial in 0..8 {
            let (w, h) = if trial % 2 == 0 { (64, 64) } else { (80, 48) };
            let n = num_steps_for(w, h);
            let mut device = SoftwareDevice::new(256);
            let program = device.compile(&KernelSource::jump_flood(n)).unwrap();

            let count = rng.gen_range(1..24);
            let seeds: Vec<(u32, u32)> = (0..count)
                .map(|_| (rng.gen_range(0..w), rng.gen_range(0..h)))
                .collect();
            let mut buffers = buffers_with_seeds(&mut device, w, h, &seeds);
            propagate(&program, &mut buffers, 1..=n);

            let tree = oracle(w, h, &seeds);
            let vp = Viewport::new(w, h);
            let mut mismatches = 0;
            for y in 0..h {
                for x in 0..w {
                    let t = SeedTexel::from_channels(buffers.current().texel(x, y));
                    assert!(t.is_valid(), "trial {trial}: ({x},{y}) never reached");
                    let found = t.nearest_seed.distance_to(vp.texcoord(x, y)) as f64;
                    let exact = exact_distance(&tree, vp.texcoord(x, y));
                    assert!(found + 1e-5 >= exact);
                    assert!(found - exact < 0.1, "trial {trial}: ({x},{y}) far off");
                    if found - exact > 1e-5 {
                        mismatches += 1;
                    }
                }
            }
            let total = (w * h) as f64;
            assert!(
                (mismatches as f64) / total < 0.01,
                "trial {trial}: {mismatches} of {total} pixels off"
            );
        }
    }

    #[test]
    fn test_extra_pass_is_fixed_point() {
        let mut rng = StdRng::seed_from_u64(7);
        let (w, h) = (48, 48);
        let n = num_steps_for(w, h);
        let mut device = SoftwareDevice::new(256);
        let program = device.compile(&KernelSource::jump_flood(n)).unwrap();
        let seeds: Vec<(u32, u32)> = (0..12)
            .map(|_| (rng.gen_range(0..w), rng.gen_range(0..h)))
            .collect();
        let mut buffers = buffers_with_seeds(&mut device, w, h, &seeds);
        propagate(&program, &mut buffers, 1..=n);

        let tree = oracle(w, h, &seeds);
        let vp = Viewport::new(w, h);
        let converged = buffers.current().clone();
        propagate(&program, &mut buffers, std::iter::once(n));

        for y in 0..h {
            for x in 0..w {
                let p = vp.texcoord(x, y);
                let before = SeedTexel::from_channels(converged.texel(x, y));
                let after = SeedTexel::from_channels(buffers.current().texel(x, y));
                let d_before = before.nearest_seed.distance_to(p);
                let d_after = after.nearest_seed.distance_to(p);
                assert!(d_after <= d_before);
                if (d_before as f64 - exact_distance(&tree, p)).abs() < 1e-5 {
                    // Only an equidistant seed may take over.
                    assert!((d_before - d_after).abs() < 1e-6, "({x},{y}) moved");
                }
            }
        }
    }

    #[test]
    fn test_single_seed_fills_grid_exactly() {
        let mut device = SoftwareDevice::new(256);
        let program = device.compile(&KernelSource::jump_flood(5)).unwrap();
        let mut buffers = buffers_with_seeds(&mut device, 32, 20, &[(21, 7)]);
        propagate(&program, &mut buffers, 1..=5);
        let expected = Viewport::new(32, 20).texcoord(21, 7);
        let result = buffers.current().clone();
        assert!(result
            .texels()
            .iter()
            .all(|t| SeedTexel::from_channels(*t).nearest_seed == expected));

        propagate(&program, &mut buffers, std::iter::once(5));
        assert_eq!(buffers.current().texels(), result.texels());
    }

    #[test]
    fn test_rejects_mismatched_sizes_and_programs() {
        let mut device = SoftwareDevice::new(256);
        let programs = ProgramSet::compile(&mut device, 3).unwrap();
        let a = device.create_target(8, 8).unwrap();
        let mut b = device.create_target(4, 8).unwrap();
        assert!(matches!(
            run_pass(&programs.jump_flood, &a, &mut b, 1),
            Err(RenderError::Resource { .. })
        ));
        let mut c = device.create_target(8, 8).unwrap();
        assert!(matches!(
            run_pass(&programs.blit, &a, &mut c, 1),
            Err(RenderError::ProgramMismatch { .. })
        ));
    }
}
