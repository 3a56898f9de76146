/// The 17 keypoints emitted by single-person pose models, in output-tensor order.
///
/// The discriminants are the row indices of the detector output and the joint
/// order of the embedding. Never reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(usize)]
pub enum BodyPart {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

impl BodyPart {
    pub const COUNT: usize = 17;

    pub const ALL: [BodyPart; BodyPart::COUNT] = [
        BodyPart::Nose,
        BodyPart::LeftEye,
        BodyPart::RightEye,
        BodyPart::LeftEar,
        BodyPart::RightEar,
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftElbow,
        BodyPart::RightElbow,
        BodyPart::LeftWrist,
        BodyPart::RightWrist,
        BodyPart::LeftHip,
        BodyPart::RightHip,
        BodyPart::LeftKnee,
        BodyPart::RightKnee,
        BodyPart::LeftAnkle,
        BodyPart::RightAnkle,
    ];

    /// Shoulders and hips, the anchors of the crop tracker.
    pub const TORSO: [BodyPart; 4] = [
        BodyPart::LeftShoulder,
        BodyPart::RightShoulder,
        BodyPart::LeftHip,
        BodyPart::RightHip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BodyPart::Nose => "nose",
            BodyPart::LeftEye => "left_eye",
            BodyPart::RightEye => "right_eye",
            BodyPart::LeftEar => "left_ear",
            BodyPart::RightEar => "right_ear",
            BodyPart::LeftShoulder => "left_shoulder",
            BodyPart::RightShoulder => "right_shoulder",
            BodyPart::LeftElbow => "left_elbow",
            BodyPart::RightElbow => "right_elbow",
            BodyPart::LeftWrist => "left_wrist",
            BodyPart::RightWrist => "right_wrist",
            BodyPart::LeftHip => "left_hip",
            BodyPart::RightHip => "right_hip",
            BodyPart::LeftKnee => "left_knee",
            BodyPart::RightKnee => "right_knee",
            BodyPart::LeftAnkle => "left_ankle",
            BodyPart::RightAnkle => "right_ankle",
        }
    }

    pub fn is_eye(self) -> bool {
        matches!(self, BodyPart::LeftEye | BodyPart::RightEye)
    }
}

impl From<BodyPart> for usize {
    fn from(part: BodyPart) -> usize {
        part as usize
    }
}

impl TryFrom<usize> for BodyPart {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        BodyPart::ALL.get(value).copied().ok_or_else(|| {
            format!(
                "Invalid body part index: {}. Must be in range 0-{}.",
                value,
                BodyPart::COUNT - 1
            )
        })
    }
}
