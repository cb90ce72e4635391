// src/pose.rs
//
// Pose model. Keypoints live in a fixed array indexed by `Joint`, so a
// missing joint is a `None` slot rather than a failed name lookup.

use serde::{Deserialize, Serialize};

pub const JOINT_COUNT: usize = 17;

/// COCO-17 body joints, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Nose,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

/// Which arm/leg chain the form scorer reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hand {
    Left,
    #[default]
    Right,
}

impl Hand {
    pub fn shoulder(self) -> Joint {
        match self {
            Hand::Left => Joint::LeftShoulder,
            Hand::Right => Joint::RightShoulder,
        }
    }

    pub fn elbow(self) -> Joint {
        match self {
            Hand::Left => Joint::LeftElbow,
            Hand::Right => Joint::RightElbow,
        }
    }

    pub fn wrist(self) -> Joint {
        match self {
            Hand::Left => Joint::LeftWrist,
            Hand::Right => Joint::RightWrist,
        }
    }

    pub fn hip(self) -> Joint {
        match self {
            Hand::Left => Joint::LeftHip,
            Hand::Right => Joint::RightHip,
        }
    }

    pub fn knee(self) -> Joint {
        match self {
            Hand::Left => Joint::LeftKnee,
            Hand::Right => Joint::RightKnee,
        }
    }

    pub fn ankle(self) -> Joint {
        match self {
            Hand::Left => Joint::LeftAnkle,
            Hand::Right => Joint::RightAnkle,
        }
    }
}

/// Normalized [0,1] position; smaller y is higher on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Video time in seconds
    pub timestamp: f64,
    pub confidence: f32,
    keypoints: [Option<Keypoint>; JOINT_COUNT],
}

impl Pose {
    pub fn new(timestamp: f64, confidence: f32) -> Self {
        Self {
            timestamp,
            confidence,
            keypoints: [None; JOINT_COUNT],
        }
    }

    pub fn with_keypoint(mut self, joint: Joint, keypoint: Keypoint) -> Self {
        self.set(joint, keypoint);
        self
    }

    pub fn set(&mut self, joint: Joint, keypoint: Keypoint) {
        self.keypoints[joint.index()] = Some(keypoint);
    }

    pub fn get(&self, joint: Joint) -> Option<Keypoint> {
        self.keypoints[joint.index()]
    }

    pub fn detected_joints(&self) -> usize {
        self.keypoints.iter().filter(|k| k.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Joint, Keypoint)> + '_ {
        Joint::ALL
            .iter()
            .zip(self.keypoints.iter())
            .filter_map(|(joint, kp)| kp.map(|kp| (*joint, kp)))
    }
}
