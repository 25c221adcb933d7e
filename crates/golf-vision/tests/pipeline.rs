use std::collections::VecDeque;

use approx::assert_abs_diff_eq;
use serde_json::{json, Value};

use golf_vision::core::{
    project_ball, rgb_to_hsv, stick_bearing, BallProjectionInput, CameraId, CameraModel,
    CameraPose, FrameError, FrameRequest, FrameSource, HeadActuator, HeadPose, Joint,
    LandmarkDescriptor, MarkerFeed, PoseSource, ProjectionError, RawFrame, ReferenceFrame,
    SourceError, Stance, DEFAULT_BALL_RADIUS,
};
use golf_vision::landmark::SearchState;
use golf_vision::{GolfVision, Sources, VisionConfig, VisionError};

const GRASS: [u8; 3] = [30, 140, 40];
const RED: [u8; 3] = [220, 25, 25];
const YELLOW: [u8; 3] = [210, 205, 30];

struct FakeCamera {
    active: CameraId,
    frames: VecDeque<RawFrame>,
    acquired: usize,
}

impl FakeCamera {
    fn with(frames: Vec<RawFrame>) -> Self {
        Self {
            active: CameraId::Top,
            frames: frames.into(),
            acquired: 0,
        }
    }
}

impl FrameSource for FakeCamera {
    fn active_camera(&mut self) -> Result<CameraId, SourceError> {
        Ok(self.active)
    }

    fn set_active_camera(&mut self, camera: CameraId) -> Result<(), SourceError> {
        self.active = camera;
        Ok(())
    }

    fn acquire(&mut self, _request: &FrameRequest) -> Result<RawFrame, SourceError> {
        self.acquired += 1;
        self.frames
            .pop_front()
            .ok_or_else(|| SourceError::Transport("no frame queued".to_string()))
    }
}

struct FakePoses {
    camera: [f64; 6],
    head: [f64; 6],
    head_pitch: f64,
    head_yaw: f64,
}

impl Default for FakePoses {
    fn default() -> Self {
        Self {
            camera: [0.05, 0.0, 0.48, 0.0, 0.0, 0.0],
            head: [0.0, 0.0, 0.43, 0.0, 0.0, 0.1],
            head_pitch: 0.0,
            head_yaw: 0.1,
        }
    }
}

impl PoseSource for FakePoses {
    fn position(
        &mut self,
        frame_name: &str,
        _reference: ReferenceFrame,
        _use_sensors: bool,
    ) -> Result<[f64; 6], SourceError> {
        match frame_name {
            "Head" => Ok(self.head),
            "CameraBottom" | "CameraTop" => Ok(self.camera),
            other => Err(SourceError::Transport(format!("unknown frame {other}"))),
        }
    }

    fn joint_angle(&mut self, joint: Joint, _use_sensors: bool) -> Result<f64, SourceError> {
        Ok(match joint {
            Joint::HeadPitch => self.head_pitch,
            Joint::HeadYaw => self.head_yaw,
        })
    }
}

#[derive(Default)]
struct FakeHead {
    moves: Vec<(f64, f64)>,
}

impl HeadActuator for FakeHead {
    fn move_head(&mut self, pitch: f64, yaw: f64) -> Result<(), SourceError> {
        self.moves.push((pitch, yaw));
        Ok(())
    }
}

#[derive(Default)]
struct FakeFeed {
    payloads: VecDeque<Value>,
    subscribed: bool,
}

impl MarkerFeed for FakeFeed {
    fn subscribe(&mut self, _client: &str) -> Result<(), SourceError> {
        self.subscribed = true;
        Ok(())
    }

    fn unsubscribe(&mut self, _client: &str) -> Result<(), SourceError> {
        self.subscribed = false;
        Ok(())
    }

    fn poll(&mut self) -> Result<Value, SourceError> {
        Ok(self.payloads.pop_front().unwrap_or(Value::Null))
    }
}

type Vision = GolfVision<FakeCamera, FakePoses, FakeHead, FakeFeed>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// VGA frame in the camera's HSV layout.
fn hsv_frame(paint: impl Fn(usize, usize) -> [u8; 3]) -> RawFrame {
    let (w, h) = (640, 480);
    let mut data = Vec::with_capacity(w * h * 3);
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&rgb_to_hsv(paint(x, y)));
        }
    }
    RawFrame {
        width: w,
        height: h,
        channels: 3,
        data,
    }
}

fn ball_frame(cx: f64, cy: f64, r: f64) -> RawFrame {
    hsv_frame(|x, y| {
        let dx = x as f64 - cx;
        let dy = y as f64 - cy;
        if dx * dx + dy * dy <= r * r {
            RED
        } else {
            GRASS
        }
    })
}

fn vision(frames: Vec<RawFrame>, feed: FakeFeed) -> Vision {
    init_logging();
    let sources = Sources {
        frames: FakeCamera::with(frames),
        poses: FakePoses::default(),
        head: FakeHead::default(),
        markers: feed,
    };
    GolfVision::new(sources, VisionConfig::default().without_settle()).expect("valid config")
}

#[test]
fn ball_cycle_reports_observation_and_position_together() {
    let mut v = vision(vec![ball_frame(300.0, 330.0, 20.0)], FakeFeed::default());
    let report = v.ball_cycle(Stance::StandUp).expect("cycle");

    let sighting = report.sighting.expect("ball");
    let obs = sighting.observation;
    assert!(obs.center_x.abs_diff(300) <= 2, "{obs:?}");
    assert!(obs.center_y.abs_diff(330) <= 2, "{obs:?}");
    assert!(obs.radius > 0);

    let expected = project_ball(&BallProjectionInput {
        center_x: f64::from(obs.center_x),
        center_y: f64::from(obs.center_y),
        frame_width: 640,
        frame_height: 480,
        camera: CameraModel::default(),
        camera_pose: CameraPose::from_position([0.05, 0.0, 0.48, 0.0, 0.0, 0.0]),
        head: HeadPose {
            pitch: 0.0,
            yaw: 0.1,
        },
        stance: Stance::StandUp,
        ball_radius: DEFAULT_BALL_RADIUS,
    })
    .expect("projection");
    assert_eq!(sighting.position, expected);
    assert!(sighting.position.dis_x > 0.0);
    assert_eq!(v.sources().frames.active, CameraId::Bottom);
}

#[test]
fn missing_ball_reports_zeros() {
    let mut v = vision(vec![hsv_frame(|_, _| GRASS)], FakeFeed::default());
    let report = v.ball_cycle(Stance::StandInit).expect("cycle");
    assert!(!report.found());
    assert_eq!(report.observation_or_zero().radius, 0);
    assert_eq!(report.position_or_zero().dis_x, 0.0);
    assert_eq!(report.position_or_zero().angle, 0.0);
}

#[test]
fn unknown_stance_fails_before_acquisition() {
    let mut v = vision(vec![ball_frame(300.0, 330.0, 20.0)], FakeFeed::default());
    let err = v.ball_cycle_named("kneel").unwrap_err();
    assert!(matches!(
        err,
        VisionError::Projection(ProjectionError::UnknownStance(ref s)) if s == "kneel"
    ));
    assert_eq!(v.sources().frames.acquired, 0);

    let report = v.ball_cycle_named("standInit").expect("cycle");
    assert!(report.found());
}

#[test]
fn short_frame_buffer_is_an_error_not_a_stale_result() {
    let mut short = ball_frame(300.0, 330.0, 20.0);
    short.data.truncate(1000);
    let mut v = vision(vec![short], FakeFeed::default());
    let err = v.ball_cycle(Stance::StandUp).unwrap_err();
    assert!(matches!(
        err,
        VisionError::Source(SourceError::Frame(FrameError::BufferLength { got: 1000, .. }))
    ));
}

#[test]
fn stick_cycle_adds_head_yaw_to_bearing() {
    let frame = hsv_frame(|x, y| {
        if (300..316).contains(&x) && (200..420).contains(&y) {
            YELLOW
        } else {
            GRASS
        }
    });
    let mut v = vision(vec![frame], FakeFeed::default());
    let report = v.stick_cycle().expect("cycle");

    let rect = report.rect_or_empty();
    assert!(!rect.is_empty());
    assert!(rect.y >= 190 && rect.y <= 200, "{rect:?}");
    let expected = stick_bearing(&rect, 640, &CameraModel::default(), 0.1);
    assert_abs_diff_eq!(report.angle_or_zero(), expected, epsilon = 1e-12);
    assert_abs_diff_eq!(report.angle_or_zero(), 0.1, epsilon = 0.05);
}

#[test]
fn no_stick_means_empty_rect_and_zero_angle() {
    let mut v = vision(vec![hsv_frame(|_, _| GRASS)], FakeFeed::default());
    let report = v.stick_cycle().expect("cycle");
    assert!(report.rect_or_empty().is_empty());
    assert_eq!(report.angle_or_zero(), 0.0);
}

#[test]
fn landmark_sweep_exhausts_to_zero_descriptor() {
    let mut v = vision(Vec::new(), FakeFeed::default());
    let outcome = v.search_landmark().expect("sweep");
    assert_eq!(outcome.state, SearchState::NotFound);
    assert_eq!(outcome.descriptor_or_zero(), LandmarkDescriptor::ZERO);
    assert_eq!(v.sources().head.moves.len(), 7);
    assert!(!v.sources().markers.subscribed);
}

#[test]
fn landmark_sweep_and_locate_use_the_feed() {
    let payload = json!([[0, 0], [[[1, 0.05, 0.0, 0.1, 0.1, 0.0], [64]]]]);
    let feed = FakeFeed {
        payloads: VecDeque::from(vec![Value::Null, payload.clone(), payload]),
        ..FakeFeed::default()
    };
    let mut v = vision(Vec::new(), feed);

    let outcome = v.search_landmark().expect("sweep");
    let d = outcome.descriptor().expect("found");
    assert_abs_diff_eq!(d.head_relative_azimuth, 0.15, epsilon = 1e-12);
    assert_eq!(outcome.visited_deg.len(), 2);

    let sighting = v.locate_landmark().expect("locate").expect("landmark");
    assert!(sighting.position.dis_x > 0.05);
    assert!(sighting.position.dis_y > 0.0);
    assert_abs_diff_eq!(
        sighting.position.yaw_angle,
        sighting.position.dis_x.atan2(sighting.position.dis_y),
        epsilon = 1e-12
    );
    assert_eq!(v.sources().frames.active, CameraId::Top);
}

#[test]
fn config_round_trips_through_json_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("vision.json");

    let mut cfg = VisionConfig::default();
    cfg.stick.crop_keep = 0.6;
    cfg.ball.selection.target_red_ratio = 0.2;
    cfg.write_json(&path).expect("write");

    let loaded = VisionConfig::load_json(&path).expect("load");
    assert_eq!(loaded, cfg);
}

#[test]
fn invalid_crop_is_rejected_at_construction() {
    let mut cfg = VisionConfig::default();
    cfg.stick.crop_keep = 0.0;
    let sources = Sources {
        frames: FakeCamera::with(Vec::new()),
        poses: FakePoses::default(),
        head: FakeHead::default(),
        markers: FakeFeed::default(),
    };
    assert!(matches!(
        GolfVision::new(sources, cfg),
        Err(VisionError::Stick(_))
    ));
}
