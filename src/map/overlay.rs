use geo_types::Coord;

use crate::entities::{NewPoi, Poi, PoiPatch};
use crate::geo::to_lon_lat;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum State {
    Idle,
    Create { coordinate: Coord<f64> },
    Edit { id: i64, coordinate: Coord<f64> },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pub title: String,
    pub address: String,
}

/// Request the overlay asks for when its form is submitted.
#[derive(Clone, Debug, PartialEq)]
pub enum Submission {
    Create(NewPoi),
    Update { id: i64, patch: PoiPatch },
}

/// Popup form anchored to the last clicked map coordinate.
#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    state: State,
    form: Form,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            state: State::Idle,
            form: Form::default(),
        }
    }
}

impl Overlay {
    pub fn state(&self) -> State {
        self.state
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn is_open(&self) -> bool {
        self.state != State::Idle
    }

    /// Id of the POI being edited, if any.
    pub fn id(&self) -> Option<i64> {
        match self.state {
            State::Edit { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Projected anchor of the popup, `None` while hidden.
    pub fn position(&self) -> Option<Coord<f64>> {
        match self.state {
            State::Idle => None,
            State::Create { coordinate } | State::Edit { coordinate, .. } => Some(coordinate),
        }
    }

    pub fn open_create(&mut self, coordinate: Coord<f64>) {
        self.state = State::Create { coordinate };
        self.form = Form::default();
    }

    pub fn open_edit(&mut self, coordinate: Coord<f64>, poi: &Poi) {
        self.state = State::Edit {
            id: poi.id,
            coordinate,
        };
        self.form = Form {
            title: poi.title.clone(),
            address: poi.address.clone(),
        };
    }

    pub fn close(&mut self) {
        self.state = State::Idle;
        self.form = Form::default();
    }

    pub fn set_title(&mut self, title: String) {
        if self.is_open() {
            self.form.title = title;
        }
    }

    pub fn set_address(&mut self, address: String) {
        if self.is_open() {
            self.form.address = address;
        }
    }

    /// The request a submit would issue, or `None` when the form is
    /// hidden or a field is empty.
    pub fn submission(&self) -> Option<Submission> {
        if self.form.title.is_empty() || self.form.address.is_empty() {
            return None;
        }

        let Form { title, address } = self.form.clone();

        match self.state {
            State::Idle => None,
            State::Edit { id, .. } => Some(Submission::Update {
                id,
                patch: PoiPatch::new(title, address),
            }),
            State::Create { coordinate } => Some(Submission::Create(NewPoi::new(
                title,
                address,
                to_lon_lat(coordinate),
            ))),
        }
    }
}
