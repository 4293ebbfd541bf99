use std::fmt;

use serde::ser::{Serialize, Serializer};

/// The scalar carried by an `Element`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Str(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(f) => Some(f),
            Value::Int(i) => Some(i as f64),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(&s[..]),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Str(v) => serializer.serialize_str(v),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ScalarKind {
    Float,
    Int,
    Str,
}

#[derive(Fail, Debug, PartialEq)]
pub enum FieldError {
    #[fail(display = "'{}' is not a valid float for {}", text, field)]
    InvalidFloat { field: &'static str, text: String },
    #[fail(display = "'{}' is not a valid integer for {}", text, field)]
    InvalidInt { field: &'static str, text: String },
    #[fail(display = "no value supplied for {}", _0)]
    Empty(&'static str),
}

/// The common surface of every kind of telemetry field.
pub trait TelemetryField {
    /// The stable key this field is stored under in a `Packet`.
    fn canonical_name(&self) -> &'static str;
    /// Every dialect-specific label that maps to this field.
    fn aliases(&self) -> &'static [&'static str];
    /// Build an element of this kind out of raw text.
    fn from_text(&self, text: &str) -> Result<Element, FieldError>;
}

/// Every field this crate understands, plus the catch-all `Unknown`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FieldKind {
    Timestamp,
    Datetime,
    TimeframeBegin,
    TimeframeEnd,
    Checksum,
    UasLocalSetVersion,
    MissionId,
    PlatformTailNumber,
    PlatformDesignation,
    PlatformCallSign,
    ImageSourceSensor,
    ImageCoordinateSystem,
    Latitude,
    Longitude,
    Altitude,
    SensorEllipsoidHeight,
    SensorEllipsoidHeightExtended,
    SensorWgs84Altitude,
    SensorGroundAltitude,
    SensorLaunchAltitude,
    AltitudeAgl,
    HomeLatitude,
    HomeLongitude,
    HomeAltitude,
    PlatformHeadingAngle,
    PlatformPitchAngleShort,
    PlatformPitchAngleFull,
    PlatformRollAngleShort,
    PlatformRollAngleFull,
    PlatformAngleOfAttack,
    PlatformAngleOfAttackFull,
    PlatformSideslipAngle,
    PlatformSideslipAngleFull,
    PlatformMagneticHeading,
    PlatformCourseAngle,
    Speed,
    HorizontalSpeed,
    VerticalSpeed,
    PlatformGroundSpeed,
    PlatformIndicatedAirspeed,
    PlatformVerticalSpeed,
    SensorNorthVelocity,
    SensorEastVelocity,
    Distance,
    Height,
    SensorHorizontalFov,
    SensorVerticalFov,
    SensorFieldOfViewName,
    SensorRelativeAzimuthAngle,
    SensorRelativeElevationAngle,
    SensorRelativeRollAngle,
    SlantRange,
    GroundRange,
    TargetWidth,
    TargetWidthExtended,
    FrameCenterLatitude,
    FrameCenterLongitude,
    FrameCenterAltitude,
    FrameCenterHeightAboveEllipsoid,
    OffsetCornerLatitude1,
    OffsetCornerLongitude1,
    OffsetCornerLatitude2,
    OffsetCornerLongitude2,
    OffsetCornerLatitude3,
    OffsetCornerLongitude3,
    OffsetCornerLatitude4,
    OffsetCornerLongitude4,
    CornerLatitudePoint1,
    CornerLongitudePoint1,
    CornerLatitudePoint2,
    CornerLongitudePoint2,
    CornerLatitudePoint3,
    CornerLongitudePoint3,
    CornerLatitudePoint4,
    CornerLongitudePoint4,
    TargetLocationLatitude,
    TargetLocationLongitude,
    TargetLocationElevation,
    TargetTrackGateWidth,
    TargetTrackGateHeight,
    TargetErrorEstimateCe90,
    TargetErrorEstimateLe90,
    AlternatePlatformLatitude,
    AlternatePlatformLongitude,
    AlternatePlatformAltitude,
    AlternatePlatformName,
    AlternatePlatformHeading,
    AlternatePlatformEllipsoidHeight,
    AlternatePlatformEllipsoidHeightExtended,
    IcingDetected,
    WindDirection,
    WindSpeed,
    StaticPressure,
    DifferentialPressure,
    DensityAltitude,
    DensityAltitudeExtended,
    OutsideAirTemperature,
    RelativeHumidity,
    AirfieldBarometricPressure,
    AirfieldElevation,
    PlatformFuelRemaining,
    GenericFlagData,
    WeaponLoad,
    WeaponFired,
    LaserPrfCode,
    EventStartTimeUtc,
    OperationalMode,
    StreamDesignator,
    OperationalBase,
    BroadcastSource,
    RangeToRecovery,
    TimeAirborne,
    PropulsionUnitSpeed,
    Iso,
    ShutterSpeed,
    FNumber,
    ExposureValue,
    ColorTemperature,
    ColorMode,
    FocalLength,
    Unknown,
}

/// The registration table. `FieldRegistry` indexes aliases in this order, so for a duplicated
/// alias the later entry wins.
pub static FIELDS: &[FieldKind] = &[
    FieldKind::Timestamp,
    FieldKind::Datetime,
    FieldKind::TimeframeBegin,
    FieldKind::TimeframeEnd,
    FieldKind::Checksum,
    FieldKind::UasLocalSetVersion,
    FieldKind::MissionId,
    FieldKind::PlatformTailNumber,
    FieldKind::PlatformDesignation,
    FieldKind::PlatformCallSign,
    FieldKind::ImageSourceSensor,
    FieldKind::ImageCoordinateSystem,
    FieldKind::Latitude,
    FieldKind::Longitude,
    FieldKind::Altitude,
    FieldKind::SensorEllipsoidHeight,
    FieldKind::SensorEllipsoidHeightExtended,
    FieldKind::SensorWgs84Altitude,
    FieldKind::SensorGroundAltitude,
    FieldKind::SensorLaunchAltitude,
    FieldKind::AltitudeAgl,
    FieldKind::HomeLatitude,
    FieldKind::HomeLongitude,
    FieldKind::HomeAltitude,
    FieldKind::PlatformHeadingAngle,
    FieldKind::PlatformPitchAngleShort,
    FieldKind::PlatformPitchAngleFull,
    FieldKind::PlatformRollAngleShort,
    FieldKind::PlatformRollAngleFull,
    FieldKind::PlatformAngleOfAttack,
    FieldKind::PlatformAngleOfAttackFull,
    FieldKind::PlatformSideslipAngle,
    FieldKind::PlatformSideslipAngleFull,
    FieldKind::PlatformMagneticHeading,
    FieldKind::PlatformCourseAngle,
    FieldKind::Speed,
    FieldKind::HorizontalSpeed,
    FieldKind::VerticalSpeed,
    FieldKind::PlatformGroundSpeed,
    FieldKind::PlatformIndicatedAirspeed,
    FieldKind::PlatformVerticalSpeed,
    FieldKind::SensorNorthVelocity,
    FieldKind::SensorEastVelocity,
    FieldKind::Distance,
    FieldKind::Height,
    FieldKind::SensorHorizontalFov,
    FieldKind::SensorVerticalFov,
    FieldKind::SensorFieldOfViewName,
    FieldKind::SensorRelativeAzimuthAngle,
    FieldKind::SensorRelativeElevationAngle,
    FieldKind::SensorRelativeRollAngle,
    FieldKind::SlantRange,
    FieldKind::GroundRange,
    FieldKind::TargetWidth,
    FieldKind::TargetWidthExtended,
    FieldKind::FrameCenterLatitude,
    FieldKind::FrameCenterLongitude,
    FieldKind::FrameCenterAltitude,
    FieldKind::FrameCenterHeightAboveEllipsoid,
    FieldKind::OffsetCornerLatitude1,
    FieldKind::OffsetCornerLongitude1,
    FieldKind::OffsetCornerLatitude2,
    FieldKind::OffsetCornerLongitude2,
    FieldKind::OffsetCornerLatitude3,
    FieldKind::OffsetCornerLongitude3,
    FieldKind::OffsetCornerLatitude4,
    FieldKind::OffsetCornerLongitude4,
    FieldKind::CornerLatitudePoint1,
    FieldKind::CornerLongitudePoint1,
    FieldKind::CornerLatitudePoint2,
    FieldKind::CornerLongitudePoint2,
    FieldKind::CornerLatitudePoint3,
    FieldKind::CornerLongitudePoint3,
    FieldKind::CornerLatitudePoint4,
    FieldKind::CornerLongitudePoint4,
    FieldKind::TargetLocationLatitude,
    FieldKind::TargetLocationLongitude,
    FieldKind::TargetLocationElevation,
    FieldKind::TargetTrackGateWidth,
    FieldKind::TargetTrackGateHeight,
    FieldKind::TargetErrorEstimateCe90,
    FieldKind::TargetErrorEstimateLe90,
    FieldKind::AlternatePlatformLatitude,
    FieldKind::AlternatePlatformLongitude,
    FieldKind::AlternatePlatformAltitude,
    FieldKind::AlternatePlatformName,
    FieldKind::AlternatePlatformHeading,
    FieldKind::AlternatePlatformEllipsoidHeight,
    FieldKind::AlternatePlatformEllipsoidHeightExtended,
    FieldKind::IcingDetected,
    FieldKind::WindDirection,
    FieldKind::WindSpeed,
    FieldKind::StaticPressure,
    FieldKind::DifferentialPressure,
    FieldKind::DensityAltitude,
    FieldKind::DensityAltitudeExtended,
    FieldKind::OutsideAirTemperature,
    FieldKind::RelativeHumidity,
    FieldKind::AirfieldBarometricPressure,
    FieldKind::AirfieldElevation,
    FieldKind::PlatformFuelRemaining,
    FieldKind::GenericFlagData,
    FieldKind::WeaponLoad,
    FieldKind::WeaponFired,
    FieldKind::LaserPrfCode,
    FieldKind::EventStartTimeUtc,
    FieldKind::OperationalMode,
    FieldKind::StreamDesignator,
    FieldKind::OperationalBase,
    FieldKind::BroadcastSource,
    FieldKind::RangeToRecovery,
    FieldKind::TimeAirborne,
    FieldKind::PropulsionUnitSpeed,
    FieldKind::Iso,
    FieldKind::ShutterSpeed,
    FieldKind::FNumber,
    FieldKind::ExposureValue,
    FieldKind::ColorTemperature,
    FieldKind::ColorMode,
    FieldKind::FocalLength,
];

impl FieldKind {
    pub fn scalar(self) -> ScalarKind {
        use FieldKind::*;
        match self {
            Datetime | MissionId | PlatformTailNumber | PlatformDesignation | PlatformCallSign
            | ImageSourceSensor | ImageCoordinateSystem | SensorFieldOfViewName
            | AlternatePlatformName | IcingDetected | EventStartTimeUtc | OperationalMode
            | StreamDesignator | OperationalBase | BroadcastSource | ShutterSpeed | ColorMode
            | Unknown => ScalarKind::Str,
            Checksum | UasLocalSetVersion | PlatformGroundSpeed | PlatformIndicatedAirspeed
            | TargetTrackGateWidth | TargetTrackGateHeight | OutsideAirTemperature | GenericFlagData
            | WeaponLoad | WeaponFired | LaserPrfCode | TimeAirborne | PropulsionUnitSpeed | Iso
            | ColorTemperature => ScalarKind::Int,
            _ => ScalarKind::Float,
        }
    }

    /// Build an element holding an already-typed value, skipping text conversion.
    pub fn element(self, value: Value) -> Element {
        Element { kind: self, label: None, value }
    }

    pub fn float(self, value: f64) -> Element {
        self.element(Value::Float(value))
    }
}

impl TelemetryField for FieldKind {
    fn canonical_name(&self) -> &'static str {
        use FieldKind::*;
        match self {
            Timestamp => "timestamp",
            Datetime => "datetime",
            TimeframeBegin => "timeframeBegin",
            TimeframeEnd => "timeframeEnd",
            Checksum => "checksum",
            UasLocalSetVersion => "UASLocalSetVersion",
            MissionId => "missionID",
            PlatformTailNumber => "platformTailNumber",
            PlatformDesignation => "platformDesignation",
            PlatformCallSign => "platformCallSign",
            ImageSourceSensor => "imageSourceSensor",
            ImageCoordinateSystem => "imageCoordinateSystem",
            Latitude => "latitude",
            Longitude => "longitude",
            Altitude => "altitude",
            SensorEllipsoidHeight => "sensorEllipsoidHeight",
            SensorEllipsoidHeightExtended => "sensorEllipsoidHeightExtended",
            SensorWgs84Altitude => "sensorWGS84Altitude",
            SensorGroundAltitude => "sensorGroundAltitude",
            SensorLaunchAltitude => "sensorLaunchAltitude",
            AltitudeAgl => "altitudeAGL",
            HomeLatitude => "homeLatitude",
            HomeLongitude => "homeLongitude",
            HomeAltitude => "homeAltitude",
            PlatformHeadingAngle => "platformHeadingAngle",
            PlatformPitchAngleShort => "platformPitchAngleShort",
            PlatformPitchAngleFull => "platformPitchAngleFull",
            PlatformRollAngleShort => "platformRollAngleShort",
            PlatformRollAngleFull => "platformRollAngleFull",
            PlatformAngleOfAttack => "platformAngleofAttack",
            PlatformAngleOfAttackFull => "PlatformAngleofAttackFull",
            PlatformSideslipAngle => "platformSideslipAngle",
            PlatformSideslipAngleFull => "PlatformSideslipAngleFull",
            PlatformMagneticHeading => "platformMagneticHeading",
            PlatformCourseAngle => "platformCourseAngle",
            Speed => "speed",
            HorizontalSpeed => "horizontalSpeed",
            VerticalSpeed => "verticalSpeed",
            PlatformGroundSpeed => "platformGroundSpeed",
            PlatformIndicatedAirspeed => "platformIndicatedAirspeed",
            PlatformVerticalSpeed => "platformVerticalSpeed",
            SensorNorthVelocity => "sensorNorthVelocity",
            SensorEastVelocity => "sensorEastVelocity",
            Distance => "distance",
            Height => "height",
            SensorHorizontalFov => "sensorHorizontalFOV",
            SensorVerticalFov => "sensorVerticalFOV",
            SensorFieldOfViewName => "sensorFieldofViewName",
            SensorRelativeAzimuthAngle => "sensorRelativeAzimuthAngle",
            SensorRelativeElevationAngle => "sensorRelativeElevationAngle",
            SensorRelativeRollAngle => "sensorRelativeRollAngle",
            SlantRange => "slantRange",
            GroundRange => "groundRange",
            TargetWidth => "targetWidth",
            TargetWidthExtended => "targetWidthExtended",
            FrameCenterLatitude => "frameCenterLatitude",
            FrameCenterLongitude => "frameCenterLongitude",
            FrameCenterAltitude => "frameCenterAltitude",
            FrameCenterHeightAboveEllipsoid => "frameCenterHeightAboveEllipsoid",
            OffsetCornerLatitude1 => "offsetCornerLatitude",
            OffsetCornerLongitude1 => "offsetCornerLongitude",
            OffsetCornerLatitude2 => "offsetCornerLatitude2",
            OffsetCornerLongitude2 => "offsetCornerLongitude2",
            OffsetCornerLatitude3 => "offsetCornerLatitude3",
            OffsetCornerLongitude3 => "offsetCornerLongitude3",
            OffsetCornerLatitude4 => "offsetCornerLatitude4",
            OffsetCornerLongitude4 => "offsetCornerLongitude4",
            CornerLatitudePoint1 => "cornerLatitudePoint1",
            CornerLongitudePoint1 => "cornerLongitudePoint1",
            CornerLatitudePoint2 => "cornerLatitudePoint2",
            CornerLongitudePoint2 => "cornerLongitudePoint2",
            CornerLatitudePoint3 => "cornerLatitudePoint3",
            CornerLongitudePoint3 => "cornerLongitudePoint3",
            CornerLatitudePoint4 => "cornerLatitudePoint4",
            CornerLongitudePoint4 => "cornerLongitudePoint4",
            TargetLocationLatitude => "targetLocationLatitude",
            TargetLocationLongitude => "targetLocationLongitude",
            TargetLocationElevation => "targetLocationElevation",
            TargetTrackGateWidth => "targetTrackGateWidth",
            TargetTrackGateHeight => "targetTrackGateHeight",
            TargetErrorEstimateCe90 => "targetErrorEstimateCE90",
            TargetErrorEstimateLe90 => "targetErrorEstimateLE90",
            AlternatePlatformLatitude => "alternatePlatformLatitude",
            AlternatePlatformLongitude => "alternatePlatformLongitude",
            AlternatePlatformAltitude => "alternatePlatformAltitude",
            AlternatePlatformName => "alternatePlatformName",
            AlternatePlatformHeading => "alternatePlatformHeading",
            AlternatePlatformEllipsoidHeight => "alternatePlatformEllipsoidHeight",
            AlternatePlatformEllipsoidHeightExtended => "alternatePlatformEllipsoidHeightExtended",
            IcingDetected => "icingDetected",
            WindDirection => "windDirection",
            WindSpeed => "windSpeed",
            StaticPressure => "staticPressure",
            DifferentialPressure => "differentialPressure",
            DensityAltitude => "densityAltitude",
            DensityAltitudeExtended => "densityAltitudeExtended",
            OutsideAirTemperature => "outsideAirTemperature",
            RelativeHumidity => "relativeHumidity",
            AirfieldBarometricPressure => "airfieldBarometricPressure",
            AirfieldElevation => "airfieldElevation",
            PlatformFuelRemaining => "platformFuelRemaining",
            GenericFlagData => "genericFlagData",
            WeaponLoad => "weaponLoad",
            WeaponFired => "weaponFired",
            LaserPrfCode => "laserPRFCode",
            EventStartTimeUtc => "eventStartTimeUTC",
            OperationalMode => "operationalMode",
            StreamDesignator => "streamDesignator",
            OperationalBase => "operationalBase",
            BroadcastSource => "broadcastSource",
            RangeToRecovery => "rangeToRecovery",
            TimeAirborne => "timeAirborne",
            PropulsionUnitSpeed => "propulsionUnitSpeed",
            Iso => "iso",
            ShutterSpeed => "shutterSpeed",
            FNumber => "fNumber",
            ExposureValue => "exposureValue",
            ColorTemperature => "colorTemperature",
            ColorMode => "colorMode",
            FocalLength => "focalLength",
            Unknown => "",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        use FieldKind::*;
        match self {
            Timestamp => &["timestamp", "Timestamp", "time stamp", "Time Stamp"],
            Datetime => &["datetime", "Datetime", "DateTime", "time"],
            TimeframeBegin => &[
                "timeframeBegin", "TimeframeBegin", "timeframebegin", "Timeframe Begin",
                "timeframe begin",
            ],
            TimeframeEnd => &[
                "timeframeEnd", "TimeframeEnd", "timeframeend", "Timeframe End", "timeframe end",
            ],
            Checksum => &["checksum", "Checksum"],
            UasLocalSetVersion => &[
                "UASLocalSetVersion", "uaslocalsetversion", "UAS Local Set Version",
                "uas local set version", "uasLocalSetVersion",
            ],
            MissionId => &["missionID", "MissionId", "Missionid", "missionId", "missionid"],
            PlatformTailNumber => &["platformTailNumber"],
            PlatformDesignation => &[
                "platformDesignation", "PlatformDesignation", "platformdesignation",
                "Platform Designation", "platform designation", "platform", "model",
            ],
            PlatformCallSign => &["platformCallSign"],
            ImageSourceSensor => &[
                "imageSourceSensor", "ImageSourceSensor", "imagesourcesensor",
                "Image Source Sensor", "image source sensor", "Image Source", "image source",
                "Source Sensor", "source sensor",
            ],
            ImageCoordinateSystem => &[
                "imageCoordinateSystem", "ImageCoordinateSystem", "imagecoordinateSystem",
                "Image Coordinate System", "image coordinate system", "Coordinate System",
                "coordinate system",
            ],
            Latitude => &[
                "Latitude", "latitude", "sensorLatitude", "SensorLatitude", "sensorlatitude",
                "Sensor Latitude", "sensor latitude", "Lat", "lat", "LATITUDE", "LAT",
            ],
            // DJI firmware spells it "longtitude" in the bracketed dialect.
            Longitude => &[
                "Longitude", "longitude", "sensorLongitude", "SensorLongitude", "sensorlongitude",
                "Sensor Longitude", "sensor longitude", "Long", "long", "LONG", "Lon", "lon", "LON",
                "longtitude",
            ],
            Altitude => &[
                "Altitude", "altitude", "sensorTrueAltitude", "SensorTrueAltitude",
                "sensortruealtitude", "Sensor True Altitude", "sensor true altitude", "ALT", "Alt",
                "alt", "Altitude (m)", "ele", "BAROMETER", "Barometer", "barometer", "abs_alt",
            ],
            SensorEllipsoidHeight => &[
                "sensorEllipsoidHeight", "SensorEllipsoidHeight", "sensorellipsoidheight",
                "Sensor Ellipsoid Height", "sensor ellipsoid height",
            ],
            SensorEllipsoidHeightExtended => &[
                "sensorEllipsoidHeightExtended", "SensorEllipsoidHeightExtended",
                "sensorellipsoidheightextended", "Sensor Ellipsoid Height Extended",
                "sensor ellipsoid heigt extended",
            ],
            SensorWgs84Altitude => &[
                "sensorWGS84Altitude", "SensorWGS84Altitude", "sensorWGS84altitude",
                "sensortwgs64altitude",
            ],
            SensorGroundAltitude => &[
                "sensorGroundAltitude", "SensorGroundAltitude", "sensorgroundaltitude",
                "Sensor Ground Altitude", "sensor ground altitude",
            ],
            SensorLaunchAltitude => &[
                "sensorLaunchAltitude", "SensorLaunchAltitude", "sensorlaunchaltitude",
                "Sensor Launch Altitude", "sensor launch altitude",
            ],
            AltitudeAgl => &["altitudeAGL"],
            HomeLatitude => &["homeLatitude", "HomeLatitude", "homelatitude", "home_lat"],
            HomeLongitude => &["homeLongitude", "HomeLongitude", "homelongitude", "home_lon"],
            HomeAltitude => &["homeAltitude", "HomeAltitude", "homealtitude", "home_alt"],
            PlatformHeadingAngle => &[
                "platformHeadingAngle", "PlatformHeadingAngle", "platformheadingangle",
                "headingAngle", "HeadingAngle", "headingangle", "Heading Angle", "heading angle",
                "heading", "Heading", "yaw", "Yaw",
            ],
            PlatformPitchAngleShort => &[
                "platformPitchAngleShort", "PlatformPitchAngleShort", "platformpitchangleshort",
                "pitchAngleShort", "PitchAngleShort", "pitchangleshort", "Pitch Angle Short",
                "pitch angle short",
            ],
            // Bare pitch and roll labels come from attitude logs, which report the full range.
            PlatformPitchAngleFull => &[
                "platformPitchAngleFull", "PlatformPitchAngleFull", "platformpitchanglefull",
                "pitchAngleFull", "PitchAngleFull", "Pitch Angle Full", "pitch angle full", "pitch",
                "Pitch",
            ],
            PlatformRollAngleShort => &[
                "platformRollAngleShort", "PlatformRollAngleShort", "platformrollangleshort",
                "rollAngleShort", "RollAngleShort", "rollangleshort", "Roll Angle Short",
                "roll angle short", "roll short", "Roll Short",
            ],
            PlatformRollAngleFull => &[
                "platformRollAngleFull", "PlatformRollAngleFull", "platformrollanglefull",
                "rollAngleFull", "RollAngleFull", "Roll Angle Full", "roll angle full", "roll full",
                "Roll Full", "roll", "Roll",
            ],
            PlatformAngleOfAttack => &["platformAngleofAttack"],
            PlatformAngleOfAttackFull => &["PlatformAngleofAttackFull"],
            PlatformSideslipAngle => &["platformSideslipAngle"],
            PlatformSideslipAngleFull => &["PlatformSideslipAngleFull"],
            PlatformMagneticHeading => &["platformMagneticHeading"],
            PlatformCourseAngle => &["platformCourseAngle"],
            Speed => &["speed", "Speed", "velocity", "Velocity", "badelf:speed"],
            HorizontalSpeed => &["horizontalSpeed", "HorizontalSpeed", "H.S", "HS"],
            VerticalSpeed => &["verticalSpeed", "VerticalSpeed", "V.S", "VS"],
            PlatformGroundSpeed => &["platformGroundSpeed"],
            PlatformIndicatedAirspeed => &["platformIndicatedAirspeed"],
            PlatformVerticalSpeed => &["platformVerticalSpeed"],
            SensorNorthVelocity => &["sensorNorthVelocity"],
            SensorEastVelocity => &["sensorEastVelocity"],
            Distance => &["distance", "Distance", "D"],
            Height => &["height", "Height", "H", "rel_alt"],
            SensorHorizontalFov => &[
                "sensorHorizontalFOV", "SensorHorizontalFOV", "sensorhorizontalfov",
                "Sensor Horizontal FOV", "sensor horizontal FOV", "sensor horizontal fov",
                "Horizontal FOV", "horizontal FOV", "horizontal fov", "Horizontal FOV (deg)",
                "sensorHorizontalFov",
            ],
            SensorVerticalFov => &[
                "sensorVerticalFOV", "SensorVerticalFOV", "sensorverticalfov",
                "Sensor Vertical FOV", "sensor vertical FOV", "sensor vertical fov", "Vertical FOV",
                "vertical FOV", "vertical fov", "Vertical FOV (deg)", "sensorVerticalFov",
            ],
            SensorFieldOfViewName => &["sensorFieldofViewName"],
            SensorRelativeAzimuthAngle => &[
                "sensorRelativeAzimuthAngle", "SensorRelativeAzimuthAngle",
                "sensorrelaztiveazimuthangle", "Sensor Relative Azimuth Angle",
                "sensor relative azimuth angle", "azimuthAngle", "AzimuthAngle", "azimuthangle",
                "Azimuth Angle", "azimuth angle", "Pan", "pan", "Pan (deg)",
            ],
            SensorRelativeElevationAngle => &[
                "sensorRelativeElevationAngle", "SensorRelativeElevationAngle",
                "sensorrelativeelevationangle", "Sensor Relative Elevation Angle",
                "sensor relative elevation angle", "Tilt", "tilt", "Tilt (deg)",
            ],
            SensorRelativeRollAngle => &[
                "sensorRelativeRollAngle", "SensorRelativeRollAngle", "sensorrelativerollangle",
                "Sensor Relative Roll Angle", "sensor relative roll angle", "Roll (deg)",
            ],
            SlantRange => &[
                "slantRange", "SlantRange", "slantrange", "Slant Range", "slant range",
                "Slant Range (m)",
            ],
            GroundRange => &["groundRange"],
            TargetWidth => &[
                "targetWidth", "TargetWidth", "targetwidth", "Target Width", "target width",
                "Horizontal Span (m)",
            ],
            TargetWidthExtended => &[
                "targetWidthExtended", "TargetWidthExtended", "targetwidthextended",
                "Target Width Extended", "target width extended",
            ],
            FrameCenterLatitude => &[
                "frameCenterLatitude", "FrameCenterLatitude", "framecenterlatitude",
                "Frame Center Latitude", "frame center latitude", "Center Latitude",
                "center latitude",
            ],
            FrameCenterLongitude => &[
                "frameCenterLongitude", "FrameCenterLongitude", "framecenterlongitude",
                "Frame Center Longitude", "frame center longitude", "Center Longitude",
                "center longitude",
            ],
            FrameCenterAltitude => &[
                "frameCenterAltitude", "FrameCenterAltitude", "framecenteraltitude",
                "Frame Center Altitude", "frame center altitude", "Center Altitude",
                "center altitude", "Center Altitude (m)", "frameCenterElevation",
                "FrameCenterElevation", "framecenterelevation",
            ],
            FrameCenterHeightAboveEllipsoid => &[
                "frameCenterHeightAboveEllipsoid", "FrameCenterHeightAboveEllipsoid",
                "framecenterheightaboveellipsoid", "Frame Center Height Above Ellipsoid",
                "frame center height above ellipsoid",
            ],
            OffsetCornerLatitude1 => &["offsetCornerLatitude"],
            OffsetCornerLongitude1 => &["offsetCornerLongitude"],
            OffsetCornerLatitude2 => &["offsetCornerLatitude2"],
            OffsetCornerLongitude2 => &["offsetCornerLongitude2"],
            OffsetCornerLatitude3 => &["offsetCornerLatitude3"],
            OffsetCornerLongitude3 => &["offsetCornerLongitude3"],
            OffsetCornerLatitude4 => &["offsetCornerLatitude4"],
            OffsetCornerLongitude4 => &["offsetCornerLongitude4"],
            CornerLatitudePoint1 => &["cornerLatitudePoint1"],
            CornerLongitudePoint1 => &["cornerLongitudePoint1"],
            CornerLatitudePoint2 => &["cornerLatitudePoint2"],
            CornerLongitudePoint2 => &["cornerLongitudePoint2"],
            CornerLatitudePoint3 => &["cornerLatitudePoint3"],
            CornerLongitudePoint3 => &["cornerLongitudePoint3"],
            CornerLatitudePoint4 => &["cornerLatitudePoint4"],
            CornerLongitudePoint4 => &["cornerLongitudePoint4"],
            TargetLocationLatitude => &["targetLocationLatitude"],
            TargetLocationLongitude => &["targetLocationLongitude"],
            TargetLocationElevation => &["targetLocationElevation"],
            TargetTrackGateWidth => &["targetTrackGateWidth"],
            TargetTrackGateHeight => &["targetTrackGateHeight"],
            TargetErrorEstimateCe90 => &["targetErrorEstimateCE90"],
            TargetErrorEstimateLe90 => &["targetErrorEstimateLE90"],
            AlternatePlatformLatitude => &["alternatePlatformLatitude"],
            AlternatePlatformLongitude => &["alternatePlatformLongitude"],
            AlternatePlatformAltitude => &["alternatePlatformAltitude"],
            AlternatePlatformName => &["alternatePlatformName"],
            AlternatePlatformHeading => &["alternatePlatformHeading"],
            AlternatePlatformEllipsoidHeight => &[
                "alternatePlatformEllipsoidHeight", "AlternatePlatformEllipsoidHeight",
                "alternateplatformellipsoidheight", "Alternate Platform Ellipsoid Height",
                "alternate platform ellipsoid height",
            ],
            AlternatePlatformEllipsoidHeightExtended => &[
                "alternatePlatformEllipsoidHeightExtended",
            ],
            IcingDetected => &["icingDetected"],
            WindDirection => &["windDirection"],
            WindSpeed => &["windSpeed"],
            StaticPressure => &["staticPressure"],
            DifferentialPressure => &["differentialPressure"],
            DensityAltitude => &["densityAltitude"],
            DensityAltitudeExtended => &["densityAltitudeExtended"],
            OutsideAirTemperature => &["outsideAirTemperature"],
            RelativeHumidity => &["relativeHumidity"],
            AirfieldBarometricPressure => &["airfieldBarometricPressure"],
            AirfieldElevation => &["airfieldElevation"],
            PlatformFuelRemaining => &["platformFuelRemaining"],
            GenericFlagData => &["genericFlagData"],
            WeaponLoad => &["weaponLoad"],
            WeaponFired => &["weaponFired"],
            LaserPrfCode => &["laserPRFCode"],
            EventStartTimeUtc => &["eventStartTimeUTC", "evenStartTimeUTC"],
            OperationalMode => &["operationalMode"],
            StreamDesignator => &["streamDesignator"],
            OperationalBase => &["operationalBase"],
            BroadcastSource => &["broadcastSource"],
            RangeToRecovery => &["rangeToRecovery"],
            TimeAirborne => &["timeAirborne"],
            PropulsionUnitSpeed => &["propulsionUnitSpeed"],
            Iso => &["iso", "ISO", "Iso"],
            ShutterSpeed => &[
                "shutterSpeed", "ShutterSpeed", "shutter", "Shutter", "SHUTTER", "SS",
            ],
            FNumber => &["fNumber", "FNumber", "fnum", "Fnum", "FNUM", "F-NUM", "F"],
            ExposureValue => &["exposureValue", "ExposureValue", "ev", "EV"],
            ColorTemperature => &["colorTemperature", "ColorTemperature", "ct", "CT"],
            ColorMode => &["colorMode", "ColorMode", "color_md"],
            FocalLength => &["focalLength", "FocalLength", "focal_len"],
            Unknown => &[],
        }
    }

    fn from_text(&self, text: &str) -> Result<Element, FieldError> {
        let name = self.canonical_name();
        let text = text.trim();
        let value = match self.scalar() {
            ScalarKind::Str => Value::Str(text.to_string()),
            _ if text.is_empty() => return Err(FieldError::Empty(name)),
            ScalarKind::Float => text.parse::<f64>().map(Value::Float).map_err(|_| {
                FieldError::InvalidFloat { field: name, text: text.to_string() }
            })?,
            ScalarKind::Int => text.parse::<i64>().map(Value::Int).map_err(|_| {
                FieldError::InvalidInt { field: name, text: text.to_string() }
            })?,
        };
        Ok(self.element(value))
    }
}

/// A single named telemetry value.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    kind: FieldKind,
    /// Only set for `FieldKind::Unknown`, which has no canonical name of its own.
    label: Option<String>,
    value: Value,
}

impl Element {
    /// The catch-all element for labels the registry doesn't know about. The raw label becomes
    /// its key.
    pub fn unknown(label: &str, text: &str) -> Element {
        Element {
            kind: FieldKind::Unknown,
            label: Some(label.to_string()),
            value: Value::Str(text.trim().to_string()),
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        match self.label {
            Some(ref label) => label,
            None => self.kind.canonical_name(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.as_f64()
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl Serialize for Element {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}
