#![doc = r#"
Engine [S]: the top-level struct tying every subsystem together and
sequencing one game frame per §5 CONCURRENCY & RESOURCE MODEL.

Grounded on `src/bus.rs`'s pattern of a single facade struct owning every
device by value with `pub` fields and a `new()`/`reset()` pair, generalized
here to the engine core's managers: memory pool, message queue, timer, VIP
sequencer, camera, graphics allocators, physics, sound, streaming, and the
scene graph. The two hardware "interrupt sources" (VIP, timer) are modeled
as explicit methods the host calls from its own interrupt vectors — see the
module doc on each of `on_frame_start`/`on_xpend`/`on_game_start`/
`on_timer_tick` for the short-and-non-reentrant contract that implies.
"#]

use std::collections::HashMap;

use crate::camera::{Brightness, Camera, CameraEffectManager, Optics};
use crate::clock::{ClockKind, Resolution, TimerConfig, TimerManager};
use crate::graphics::bgmap::BgmapAllocator;
use crate::graphics::char_set::CharSetManager;
use crate::graphics::param_table::ParamTableAllocator;
use crate::graphics::sprite::{SpriteId, SpriteRegistry};
use crate::graphics::texture::{write_pending, Texture};
use crate::graphics::wireframe::{Eye, WireframeBuffers, WireframeObjectRegistry};
use crate::input::{Buttons, InputState};
use crate::math::{Fix13, Frustum, Vector3D};
use crate::memory::MemoryPool;
use crate::messaging::{EventCode, Jitter, MessageQueue, ObjectId, Payload};
use crate::physics::{Body, BodyManager, Collider, ColliderManager};
use crate::sound::mixer::{SoundMixer, SoundSpecId};
use crate::sound::track::TrackProgram;
use crate::stage::Stage;
use crate::streaming::{EntityId, StreamingPads, StreamingScheduler};
use crate::vip::{OverrunPolicy, VipManager};

/// Number of pending texture writes serviced per frame; bounds the per-frame
/// VRAM write cost the way the original's incremental writer budgets itself
/// rather than flushing every dirty texture in one pass (§4.G).
pub const TEXTURE_WRITE_BUDGET_PER_FRAME: u32 = 10;

/// Host-supplied sink for the two double-buffered wireframe framebuffers,
/// consulted at XPEND (§6 EXTERNAL INTERFACES, "video device").
pub trait VideoDevice {
    fn present(&mut self, left: &crate::graphics::wireframe::Framebuffer, right: &crate::graphics::wireframe::Framebuffer, frame_parity: bool);
}

/// Host-supplied sink for per-voice output the sound mixer computes each
/// timer tick (§6, "audio device").
pub trait AudioDevice {
    fn submit_voice(&mut self, voice: usize, stereo_level: u8, fade_level: u8);
}

/// A no-op device for headless use (tests, dedicated server-style embeds
/// with no presentation layer).
#[derive(Default)]
pub struct NullVideoDevice;
impl VideoDevice for NullVideoDevice {
    fn present(&mut self, _left: &crate::graphics::wireframe::Framebuffer, _right: &crate::graphics::wireframe::Framebuffer, _frame_parity: bool) {}
}

#[derive(Default)]
pub struct NullAudioDevice;
impl AudioDevice for NullAudioDevice {
    fn submit_voice(&mut self, _voice: usize, _stereo_level: u8, _fade_level: u8) {}
}

/// Fatal conditions surfaced to the host via `Result` (§7's "Fatal" tier;
/// Overrun/Recoverable conditions are instead raised as `EventCode`s through
/// `Engine::take_fired_events`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// `load_stage` was given a spec with no entities to stream in.
    EmptyStageSpec,
}

/// Tunables fixed for the lifetime of an `Engine`; everything else (camera
/// position, time scale, pool contents) is runtime state reachable through
/// the engine's fields.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pub target_fps: u32,
    pub gravity: Vector3D,
    pub physics_dt: Fix13,
    pub timer_resolution: Resolution,
    pub timer_period: u16,
    pub overrun_policy: OverrunPolicy,
    pub stage_size: Vector3D,
    pub camera_optics: Optics,
    pub camera_hardware_limits: Frustum,
    pub streaming_load_pad: Vector3D,
    pub streaming_unload_pad: Vector3D,
    pub pool_blocks_per_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            target_fps: 50,
            gravity: Vector3D::new(Fix13::ZERO, Fix13::from_f32(-9.8), Fix13::ZERO),
            physics_dt: Fix13::from_f32(1.0 / 50.0),
            timer_resolution: Resolution::Us100,
            timer_period: 10,
            overrun_policy: OverrunPolicy::DropBehind,
            stage_size: Vector3D::from_ints(4096, 4096, 4096),
            camera_optics: Optics::default(),
            camera_hardware_limits: Frustum::new(
                Fix13::from_int(-192),
                Fix13::from_int(192),
                Fix13::from_int(-112),
                Fix13::from_int(112),
                Fix13::ZERO,
                Fix13::from_int(4096),
            ),
            streaming_load_pad: Vector3D::from_ints(512, 512, 512),
            streaming_unload_pad: Vector3D::from_ints(640, 640, 640),
            pool_blocks_per_size: 64,
        }
    }
}

/// A stage's entity manifest, as handed to `load_stage`. Positions are
/// consulted for the initial streaming cull; entities the caller doesn't
/// want streamed yet go in `load_stage`'s `ignore_list` instead of being
/// left out of `entities` here, matching the reference's "entities to
/// ignore" parameter rather than two separate manifests.
#[derive(Clone, Debug, Default)]
pub struct StageSpec {
    pub entities: Vec<EntityId>,
}

pub struct Engine<V: VideoDevice = NullVideoDevice, A: AudioDevice = NullAudioDevice> {
    config: EngineConfig,
    paused: bool,
    next_object_id: ObjectId,
    fired_events: Vec<(EventCode, ObjectId)>,

    pub memory: MemoryPool,
    pub messages: MessageQueue,
    pub jitter: Jitter,
    pub timer: TimerManager,
    pub vip: VipManager,

    pub camera: Camera,
    pub camera_effects: CameraEffectManager,

    pub char_sets: CharSetManager,
    pub bgmap: BgmapAllocator,
    pub param_table: ParamTableAllocator,
    pub textures: Vec<Texture>,
    pub sprites: SpriteRegistry,
    pub wireframes: WireframeBuffers,
    pub wireframe_objects: WireframeObjectRegistry,

    pub bodies: BodyManager,
    pub colliders: ColliderManager,

    pub sound: SoundMixer,

    pub streaming: StreamingScheduler,
    streaming_pads: StreamingPads,

    pub stage: Stage,

    input: InputState,

    video: V,
    audio: A,
}

impl Engine<NullVideoDevice, NullAudioDevice> {
    pub fn headless(config: EngineConfig) -> Self {
        Engine::new(config, NullVideoDevice, NullAudioDevice)
    }
}

impl<V: VideoDevice, A: AudioDevice> Engine<V, A> {
    pub fn new(config: EngineConfig, video: V, audio: A) -> Self {
        let streaming_pads = StreamingPads::new(config.streaming_load_pad, config.streaming_unload_pad);
        let camera = Camera::new(config.camera_optics, config.camera_hardware_limits, config.stage_size);

        Engine {
            config,
            paused: false,
            next_object_id: 1,
            fired_events: Vec::new(),

            memory: MemoryPool::with_default_layout(config.pool_blocks_per_size),
            messages: MessageQueue::new(),
            jitter: Jitter::new(0x5EED),
            timer: TimerManager::new(TimerConfig::new(config.timer_resolution, config.timer_period)),
            vip: VipManager::new(config.target_fps, config.overrun_policy),

            camera,
            camera_effects: CameraEffectManager::new(0, Brightness::default()),

            char_sets: CharSetManager::new(),
            bgmap: BgmapAllocator::new(),
            param_table: ParamTableAllocator::new(),
            textures: Vec::new(),
            sprites: SpriteRegistry::new(),
            wireframes: WireframeBuffers::new(),
            wireframe_objects: WireframeObjectRegistry::new(),

            bodies: BodyManager::new(config.gravity, config.target_fps, config.physics_dt),
            colliders: ColliderManager::new(),

            sound: SoundMixer::new(),

            streaming: StreamingScheduler::new(),
            streaming_pads,

            stage: Stage::new(),

            input: InputState::new(),

            video,
            audio,
        }
    }

    /// Issues a fresh engine-wide object id (used to address bodies,
    /// colliders, sound instances, and listeners uniformly through
    /// `ObjectId`).
    pub fn allocate_object_id(&mut self) -> ObjectId {
        let id = self.next_object_id;
        self.next_object_id += 1;
        id
    }

    /// Tears every subsystem back down to its just-constructed state,
    /// without losing the engine's configuration or host devices. Matches
    /// `reset()` named in §6's lifecycle API.
    pub fn reset(&mut self) {
        self.paused = false;
        self.next_object_id = 1;
        self.fired_events.clear();

        self.memory = MemoryPool::with_default_layout(self.config.pool_blocks_per_size);
        self.messages = MessageQueue::new();
        self.timer = TimerManager::new(TimerConfig::new(self.config.timer_resolution, self.config.timer_period));
        self.vip = VipManager::new(self.config.target_fps, self.config.overrun_policy);

        self.camera = Camera::new(self.config.camera_optics, self.config.camera_hardware_limits, self.config.stage_size);
        self.camera_effects = CameraEffectManager::new(0, Brightness::default());

        self.char_sets.reset();
        self.bgmap = BgmapAllocator::new();
        self.param_table = ParamTableAllocator::new();
        self.textures.clear();
        self.sprites = SpriteRegistry::new();
        self.wireframes.clear();
        self.wireframe_objects = WireframeObjectRegistry::new();

        self.bodies = BodyManager::new(self.config.gravity, self.config.target_fps, self.config.physics_dt);
        self.colliders = ColliderManager::new();

        self.sound = SoundMixer::new();

        self.streaming = StreamingScheduler::new();
        self.stage = Stage::new();

        self.input = InputState::new();
    }

    /// Streams `spec`'s entities in, skipping anything named in
    /// `ignore_list`. `override_camera`, if given, relocates the camera
    /// before the stream begins (e.g. a checkpoint's spawn point).
    /// `prevent_pop_in` forces the whole manifest through the streaming
    /// pipeline synchronously instead of amortising it across frames,
    /// matching the reference's "load everything now" stage-transition
    /// mode used for cutscene loads (§4.P / §4.J).
    pub fn load_stage(
        &mut self,
        spec: StageSpec,
        ignore_list: &[EntityId],
        override_camera: Option<Vector3D>,
        prevent_pop_in: bool,
    ) -> Result<(), EngineError> {
        if spec.entities.is_empty() {
            return Err(EngineError::EmptyStageSpec);
        }

        self.streaming = StreamingScheduler::new();
        self.stage = Stage::new();

        for id in spec.entities {
            if ignore_list.contains(&id) {
                continue;
            }
            self.streaming.request_spawn(id);
        }

        if let Some(position) = override_camera {
            self.camera.set_position(position);
        }

        if prevent_pop_in {
            self.streaming.prepare_all_entities();
        }

        Ok(())
    }

    /// Feeds a freshly decoded pad reading; `process_user_input` named in
    /// §6 EXTERNAL INTERFACES.
    pub fn process_user_input(&mut self, reading: Buttons) {
        self.input.update(reading);
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.timer.clock_mut(ClockKind::Animation).pause();
        self.timer.clock_mut(ClockKind::Physics).pause();
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.timer.clock_mut(ClockKind::Animation).resume();
        self.timer.clock_mut(ClockKind::Physics).resume();
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// FRAMESTART: arms the VIP deadline for a fresh game frame. Must be
    /// called with the same reentrancy discipline the hardware ISR would
    /// have: short, and not re-entered while `step`/`on_xpend` are running.
    pub fn on_frame_start(&mut self) {
        self.vip.on_frame_start();
    }

    /// The ordinary main-loop body, run once between FRAMESTART and XPEND:
    /// advances the streaming pipeline by one entity, integrates physics,
    /// runs collision detection, propagates scene-graph transforms, then
    /// synchronises the sprite WORLD assignment and services a bounded
    /// batch of pending texture writes (§5's fixed ordering). A no-op while
    /// paused.
    pub fn step(&mut self) {
        if self.paused {
            return;
        }

        self.streaming.prepare_entities();

        self.bodies.update();

        let positions: HashMap<ObjectId, Vector3D> =
            self.bodies.bodies().iter().map(|b| (b.owner, b.position())).collect();
        let mut fired = Vec::new();
        self.colliders.update(
            |owner| positions.get(&owner).copied().unwrap_or(Vector3D::ZERO),
            |code, info| fired.push((code, info.collider_owner)),
        );
        self.fired_events.extend(fired);

        self.stage.propagate_transforms();

        self.sprites.advance_frame_parity();
        let mut fired = Vec::new();
        write_pending(&mut self.textures, TEXTURE_WRITE_BUDGET_PER_FRAME, |index, code| {
            fired.push((code, index as ObjectId));
        });
        self.fired_events.extend(fired);
    }

    /// Render-world assignment computed from this frame's `step()`; exposed
    /// so a host video device can map each visible sprite onto a hardware
    /// WORLD before `on_xpend` commits the frame.
    pub fn sprite_world_assignment(&self) -> Vec<(SpriteId, u8)> {
        self.sprites.assign_worlds()
    }

    /// XPEND: draws every shown wireframe object into both eye buffers,
    /// hands them to the host video device, clears them for the next frame,
    /// and toggles the frame-parity bit. Must be called with the same
    /// reentrancy discipline the hardware ISR would have.
    pub fn on_xpend(&mut self) {
        self.wireframe_objects.draw_all(&mut self.wireframes, Eye::Left);
        self.wireframe_objects.draw_all(&mut self.wireframes, Eye::Right);
        self.video.present(&self.wireframes.left, &self.wireframes.right, self.vip.frame_parity());
        self.wireframes.clear();
        self.vip.on_xpend();
    }

    /// GAMESTART: checks whether the frame just committed overran its
    /// deadline, raising `VipOvertime` if so. Must be called with the same
    /// reentrancy discipline the hardware ISR would have.
    pub fn on_game_start(&mut self) {
        if let Some(code) = self.vip.on_game_start() {
            self.fired_events.push((code, 0));
        }
    }

    /// The hardware timer ISR body: advances every logical clock, steps the
    /// sound mixer, drains due delayed messages (dispatching camera-effect
    /// fade ticks), and updates stopwatches. Returns the elapsed
    /// microseconds. Must be called with the same reentrancy discipline the
    /// hardware ISR would have: short, and not re-entered.
    pub fn on_timer_tick(&mut self) -> u32 {
        let mut fired = Vec::new();

        let elapsed = self.timer.on_tick(|microseconds| {
            self.sound.on_tick(microseconds, |listener, code| fired.push((code, listener)));
        });

        let now_ms = self.timer.clock(ClockKind::Messaging).millis();
        for message in self.messages.drain_due(now_ms) {
            let receiver = message.receiver;
            self.camera_effects.on_message(message.code, now_ms, &mut self.messages, &mut self.jitter, |listener| {
                fired.push((EventCode::EffectFadeComplete, listener));
            });
            if let Payload::Code(code) = message.payload {
                fired.push((EventCode::Custom(code), receiver));
            }
        }

        self.fired_events.extend(fired);
        elapsed
    }

    /// Drains every event raised since the last call, for the host to
    /// route to whatever per-game handlers it maintains (§5's note that the
    /// engine core doesn't itself know what a "listener" does with an
    /// event).
    pub fn take_fired_events(&mut self) -> Vec<(EventCode, ObjectId)> {
        std::mem::take(&mut self.fired_events)
    }

    /// Classifies `entity_position` against the camera-centred streaming
    /// pads: `(should_spawn, should_unload)` (§4.J).
    pub fn classify_for_streaming(&self, entity_position: Vector3D) -> (bool, bool) {
        let camera = self.camera.position();
        (self.streaming_pads.should_spawn(camera, entity_position), self.streaming_pads.should_unload(camera, entity_position))
    }

    pub fn spawn_body(&mut self, owner: ObjectId, mass: Fix13, position: Vector3D) {
        self.bodies.add(Body::new(owner, mass, position));
    }

    pub fn spawn_collider(&mut self, collider: Collider, during_dispatch: bool) -> usize {
        self.colliders.add(collider, during_dispatch)
    }

    pub fn play_sound(
        &mut self,
        id: ObjectId,
        spec_id: SoundSpecId,
        program: TrackProgram,
        screen_x: i32,
        parallax: i32,
        mode: crate::sound::mixer::PlaybackMode,
    ) -> Option<usize> {
        self.sound.play(id, spec_id, program, screen_x, parallax, mode)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
