//! Example: Crossfading a procedural walk into a run
//!
//! Builds a small leg rig in memory, drives the pipeline for a few seconds
//! and prints the active clip, frame and transition progress. Run with
//! `RUST_LOG=debug` to see the bone hierarchy and clip switches.
//!
//! Usage: cargo run --example walk_run -- [speed-blend]

use glam::{Quat, Vec3};
use skeletal_crossfade::source::ROOT_PARENT;
use skeletal_crossfade::{
    AnimationPipeline, BlendMode, InMemorySource, PipelineConfig, PoseSpace, SourceClip,
    SourceTransform,
};
use std::f32::consts::TAU;

fn build_source() -> InMemorySource {
    let rig = [
        ("hips", ROOT_PARENT, Vec3::new(0.0, 1.0, 0.0)),
        ("thigh_l", 0, Vec3::new(0.1, -0.05, 0.0)),
        ("shin_l", 1, Vec3::new(0.0, -0.45, 0.0)),
        ("ik_foot_l", 2, Vec3::new(0.0, -0.45, 0.0)),
        ("thigh_r", 0, Vec3::new(-0.1, -0.05, 0.0)),
        ("shin_r", 4, Vec3::new(0.0, -0.45, 0.0)),
        ("ik_foot_r", 5, Vec3::new(0.0, -0.45, 0.0)),
    ];

    let mut source = InMemorySource::new();
    for (name, parent, position) in rig {
        source = source.with_bone(name, parent, SourceTransform::new(position, Quat::IDENTITY));
    }

    // Legs swing in opposite phase; amplitude grows with gait speed
    let gait = |amplitude: f32, frames: usize| {
        move |bone: usize, frame: usize| {
            let phase = frame as f32 / frames as f32 * TAU;
            let swing = match bone {
                1 | 2 => phase.sin(),
                4 | 5 => -phase.sin(),
                _ => 0.0,
            };
            SourceTransform::new(Vec3::ZERO, Quat::from_rotation_x(swing * amplitude))
        }
    };

    source
        .with_clip(SourceClip::from_fn("walk", rig.len(), 32, gait(0.4, 32)))
        .with_clip(SourceClip::from_fn("run", rig.len(), 20, gait(0.9, 20)))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mode = match std::env::args().nth(1).as_deref() {
        Some("speed-blend") => BlendMode::SpeedPoseBlend,
        _ => BlendMode::DiscreteSwitch,
    };

    let source = build_source();
    let config = PipelineConfig::default()
        .with_blend_mode(mode)
        .with_max_frame_delta(Some(0.1));
    let mut pipeline = AnimationPipeline::new(&source, &source, "walk", "run", config)?;

    println!("=== Skeleton ===");
    print!("{}", pipeline.skeleton());
    println!(
        "Hidden helper bones: {:?}",
        pipeline.skeleton().hidden_bones()
    );

    let mut uploads = 0usize;
    let delta = 1.0 / 60.0;
    for tick in 0..240 {
        let report = pipeline.tick(delta, &mut |_: &[f32], _: usize| uploads += 1)?;

        if report.switched || tick % 30 == 0 {
            println!(
                "t={:5.2}s {:?} frame {:2} sub {:.2} progress {:.2}{}",
                tick as f32 * delta,
                report.active,
                report.frame,
                report.sub_frame,
                report.transition_progress,
                if report.switched { "  <- switch" } else { "" }
            );
        }

        if report.space() == PoseSpace::Local && tick == 239 {
            let hips = report.pose.transforms[0];
            println!("Final local hips transform: {hips:?}");
        }
    }

    println!("Skinning uploads: {uploads}");
    Ok(())
}
