//! Camera feeds. Only metadata lives here; streams are never opened.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
  EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CameraStatus {
  Active,
  Inactive,
  Maintenance,
}

impl CameraStatus {
  /// The status a camera takes when its on/off switch is flipped.
  ///
  /// Anything that is not active (including maintenance) comes back active.
  pub fn toggled(self) -> Self {
    match self {
      Self::Active => Self::Inactive,
      Self::Inactive | Self::Maintenance => Self::Active,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Camera {
  pub camera_id:      String,
  pub name:           String,
  pub location:       String,
  /// RTSP or HTTP URL as entered by the operator.
  pub stream_source:  String,
  pub company_reg_no: String,
  pub status:         CameraStatus,
  pub last_activity:  DateTime<Utc>,
}

impl Camera {
  pub fn toggle(&mut self) { self.status = self.status.toggled(); }
}

/// Operator input for a camera being added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCamera {
  pub name:          String,
  pub location:      String,
  pub stream_source: String,
}

impl NewCamera {
  /// The first required field that is blank, if any.
  pub fn missing_field(&self) -> Option<&'static str> {
    [
      ("name", &self.name),
      ("location", &self.location),
      ("stream_source", &self.stream_source),
    ]
    .into_iter()
    .find(|(_, v)| v.trim().is_empty())
    .map(|(field, _)| field)
  }

  /// Materialise the camera; new cameras start active.
  pub fn into_camera(
    self,
    camera_id: String,
    company_reg_no: &str,
    now: DateTime<Utc>,
  ) -> Camera {
    Camera {
      camera_id,
      name: self.name.trim().to_owned(),
      location: self.location.trim().to_owned(),
      stream_source: self.stream_source.trim().to_owned(),
      company_reg_no: company_reg_no.to_owned(),
      status: CameraStatus::Active,
      last_activity: now,
    }
  }
}
