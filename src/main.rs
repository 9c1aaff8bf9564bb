//! Headless smoke-test driver: runs the engine core for a fixed number of
//! game frames with a no-op video/audio device, following the interrupt
//! sequence a real host would drive (§5 CONCURRENCY & RESOURCE MODEL):
//! FRAMESTART -> step -> XPEND -> GAMESTART, with the timer ISR ticking
//! independently of all of that.

use parallax_engine::engine::{Engine, EngineConfig, StageSpec};

fn main() {
    let mut engine = Engine::headless(EngineConfig::default());

    let spec = StageSpec { entities: (1..=8).collect() };
    engine.load_stage(spec, &[], None, false).expect("non-empty stage manifest");

    let ticks_per_frame = engine.config().timer_period as u32;
    let target_fps = engine.config().target_fps;

    for frame in 0..target_fps {
        engine.on_frame_start();

        for _ in 0..ticks_per_frame.max(1) {
            engine.on_timer_tick();
        }

        engine.step();

        for (sprite, world) in engine.sprite_world_assignment() {
            log::trace!("frame {frame}: sprite {sprite:?} -> WORLD {world}");
        }

        engine.on_xpend();
        engine.on_game_start();

        for (code, owner) in engine.take_fired_events() {
            println!("frame {frame}: event {code:?} from/to {owner}");
        }
    }

    println!("ran {target_fps} frames without a fatal condition");
}
