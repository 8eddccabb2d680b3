//! One-shot device location on top of a platform location service.
//!
//! The platform is reached through [`LocationSource`]; it reports back by
//! calling the `did_*` methods on [`LocationProvider`]. Results go to a
//! [`LocationObserver`].

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::{error::LocationError, model::Coordinates};

/// Platform permission state for location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationStatus {
    NotDetermined,
    AuthorizedAlways,
    AuthorizedWhenInUse,
    Denied,
    Restricted,
}

impl AuthorizationStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationEvent {
    /// The caller asked for a one-shot fix.
    Request,
    /// The platform reported a new permission state.
    AuthorizationChanged(AuthorizationStatus),
}

/// What the provider must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationAction {
    /// Ask for a location and prompt for permission at the same time.
    RequestLocationAndPrompt,
    RequestLocation,
    ReportDenied,
    NotifyAuthorization(AuthorizationStatus),
    /// Permission was withdrawn: notify, then fail every pending request.
    NotifyAndReportDenied(AuthorizationStatus),
}

/// Pure authorization transition. A permission change never issues a request
/// by itself; asking again is up to the caller.
pub fn transition(
    current: AuthorizationStatus,
    event: LocationEvent,
) -> (AuthorizationStatus, LocationAction) {
    match event {
        LocationEvent::AuthorizationChanged(next) => match next {
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                (next, LocationAction::NotifyAndReportDenied(next))
            }
            _ => (next, LocationAction::NotifyAuthorization(next)),
        },
        LocationEvent::Request => {
            let action = match current {
                AuthorizationStatus::NotDetermined => LocationAction::RequestLocationAndPrompt,
                AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse => {
                    LocationAction::RequestLocation
                }
                AuthorizationStatus::Denied | AuthorizationStatus::Restricted => {
                    LocationAction::ReportDenied
                }
            };
            (current, action)
        }
    }
}

/// Capability the platform location service exposes.
pub trait LocationSource: Send + Sync {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Ask for location updates. May deliver more than one.
    fn request_location(&self);

    fn request_when_in_use_authorization(&self);

    fn stop_updating_location(&self);
}

/// Receiver of location results.
pub trait LocationObserver: Send + Sync {
    fn on_location_fix(&self, coordinates: Coordinates);

    fn on_location_error(&self, error: LocationError);

    fn on_authorization_changed(&self, _status: AuthorizationStatus) {}
}

#[derive(Debug)]
struct State {
    authorization: AuthorizationStatus,
    /// Accepted requests still waiting for a fix or a failure.
    pending: usize,
}

/// Wraps a [`LocationSource`] and enforces one result per request.
pub struct LocationProvider {
    source: Arc<dyn LocationSource>,
    observer: Arc<dyn LocationObserver>,
    state: Mutex<State>,
}

impl LocationProvider {
    pub fn new(source: Arc<dyn LocationSource>, observer: Arc<dyn LocationObserver>) -> Self {
        let authorization = source.authorization_status();
        Self {
            source,
            observer,
            state: Mutex::new(State { authorization, pending: 0 }),
        }
    }

    pub fn authorization(&self) -> AuthorizationStatus {
        self.lock().authorization
    }

    /// Request a single fix. The observer later receives exactly one of
    /// `on_location_fix` or `on_location_error` for this call, even when
    /// earlier requests are still outstanding.
    pub fn request_one_shot_location(&self) {
        let action = {
            let mut state = self.lock();
            let (next, action) = transition(state.authorization, LocationEvent::Request);
            state.authorization = next;
            if action != LocationAction::ReportDenied {
                state.pending += 1;
            }
            action
        };

        debug!(?action, "one-shot location requested");
        self.apply(action, 0);
    }

    /// Platform callback: new locations are available. The first batch after
    /// a request answers every pending request with its most recent entry;
    /// later batches are dropped.
    pub fn did_update_locations(&self, locations: &[Coordinates]) {
        let Some(last) = locations.last().copied() else {
            return;
        };

        let answered = self.take_pending();
        if answered == 0 {
            debug!("dropping location update with no pending request");
            return;
        }

        self.source.stop_updating_location();
        for _ in 0..answered {
            self.observer.on_location_fix(last);
        }
    }

    /// Platform callback: the pending requests failed.
    pub fn did_fail(&self, error: LocationError) {
        let answered = self.take_pending();
        if answered == 0 {
            debug!(%error, "dropping location failure with no pending request");
            return;
        }

        self.source.stop_updating_location();
        for _ in 0..answered {
            self.observer.on_location_error(error.clone());
        }
    }

    /// Platform callback: permission state changed.
    pub fn did_change_authorization(&self, status: AuthorizationStatus) {
        let (action, denied) = {
            let mut state = self.lock();
            let (next, action) =
                transition(state.authorization, LocationEvent::AuthorizationChanged(status));
            state.authorization = next;
            let denied = match action {
                LocationAction::NotifyAndReportDenied(_) => std::mem::take(&mut state.pending),
                _ => 0,
            };
            (action, denied)
        };

        info!(?status, "location authorization changed");
        self.apply(action, denied);
    }

    /// `denied` is the number of pending requests the action closes.
    fn apply(&self, action: LocationAction, denied: usize) {
        match action {
            LocationAction::RequestLocationAndPrompt => {
                self.source.request_location();
                self.source.request_when_in_use_authorization();
            }
            LocationAction::RequestLocation => self.source.request_location(),
            LocationAction::ReportDenied => {
                self.observer.on_location_error(LocationError::PermissionDenied)
            }
            LocationAction::NotifyAuthorization(status) => {
                self.observer.on_authorization_changed(status)
            }
            LocationAction::NotifyAndReportDenied(status) => {
                self.observer.on_authorization_changed(status);
                if denied > 0 {
                    self.source.stop_updating_location();
                }
                for _ in 0..denied {
                    self.observer.on_location_error(LocationError::PermissionDenied);
                }
            }
        }
    }

    fn take_pending(&self) -> usize {
        std::mem::take(&mut self.lock().pending)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // State is plain data, so a poisoned lock still holds usable values.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for LocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationProvider").field("state", &*self.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum SourceCall {
        RequestLocation,
        RequestAuthorization,
        Stop,
    }

    struct FakeSource {
        status: AuthorizationStatus,
        calls: Mutex<Vec<SourceCall>>,
    }

    impl FakeSource {
        fn new(status: AuthorizationStatus) -> Arc<Self> {
            Arc::new(Self { status, calls: Mutex::new(Vec::new()) })
        }

        fn calls(&self) -> Vec<SourceCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LocationSource for FakeSource {
        fn authorization_status(&self) -> AuthorizationStatus {
            self.status
        }

        fn request_location(&self) {
            self.calls.lock().unwrap().push(SourceCall::RequestLocation);
        }

        fn request_when_in_use_authorization(&self) {
            self.calls.lock().unwrap().push(SourceCall::RequestAuthorization);
        }

        fn stop_updating_location(&self) {
            self.calls.lock().unwrap().push(SourceCall::Stop);
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Seen {
        Fix(Coordinates),
        Error(LocationError),
        Authorization(AuthorizationStatus),
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<Seen>>,
    }

    impl Recorder {
        fn seen(&self) -> Vec<Seen> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl LocationObserver for Recorder {
        fn on_location_fix(&self, coordinates: Coordinates) {
            self.seen.lock().unwrap().push(Seen::Fix(coordinates));
        }

        fn on_location_error(&self, error: LocationError) {
            self.seen.lock().unwrap().push(Seen::Error(error));
        }

        fn on_authorization_changed(&self, status: AuthorizationStatus) {
            self.seen.lock().unwrap().push(Seen::Authorization(status));
        }
    }

    fn setup(status: AuthorizationStatus) -> (Arc<FakeSource>, Arc<Recorder>, LocationProvider) {
        let source = FakeSource::new(status);
        let recorder = Arc::new(Recorder::default());
        let provider = LocationProvider::new(source.clone(), recorder.clone());
        (source, recorder, provider)
    }

    #[test]
    fn transition_table() {
        use AuthorizationStatus::*;

        assert_eq!(
            transition(NotDetermined, LocationEvent::Request),
            (NotDetermined, LocationAction::RequestLocationAndPrompt)
        );
        assert_eq!(
            transition(AuthorizedAlways, LocationEvent::Request),
            (AuthorizedAlways, LocationAction::RequestLocation)
        );
        assert_eq!(
            transition(AuthorizedWhenInUse, LocationEvent::Request),
            (AuthorizedWhenInUse, LocationAction::RequestLocation)
        );
        assert_eq!(transition(Denied, LocationEvent::Request), (Denied, LocationAction::ReportDenied));
        assert_eq!(
            transition(Restricted, LocationEvent::Request),
            (Restricted, LocationAction::ReportDenied)
        );
        assert_eq!(
            transition(NotDetermined, LocationEvent::AuthorizationChanged(Denied)),
            (Denied, LocationAction::NotifyAndReportDenied(Denied))
        );
        assert_eq!(
            transition(AuthorizedAlways, LocationEvent::AuthorizationChanged(Restricted)),
            (Restricted, LocationAction::NotifyAndReportDenied(Restricted))
        );
        assert_eq!(
            transition(NotDetermined, LocationEvent::AuthorizationChanged(AuthorizedAlways)),
            (AuthorizedAlways, LocationAction::NotifyAuthorization(AuthorizedAlways))
        );
    }

    #[test]
    fn undetermined_requests_location_and_prompts() {
        let (source, _, provider) = setup(AuthorizationStatus::NotDetermined);

        provider.request_one_shot_location();

        assert_eq!(source.calls(), vec![SourceCall::RequestLocation, SourceCall::RequestAuthorization]);
    }

    #[test]
    fn second_update_is_suppressed() {
        let (source, recorder, provider) = setup(AuthorizationStatus::AuthorizedWhenInUse);
        let first = Coordinates::new(-23.55, -46.63);

        provider.request_one_shot_location();
        provider.did_update_locations(&[first]);
        provider.did_update_locations(&[Coordinates::new(1.0, 2.0)]);

        assert_eq!(recorder.seen(), vec![Seen::Fix(first)]);
        assert_eq!(source.calls(), vec![SourceCall::RequestLocation, SourceCall::Stop]);
    }

    #[test]
    fn most_recent_location_of_a_batch_wins() {
        let (_, recorder, provider) = setup(AuthorizationStatus::AuthorizedAlways);
        let newest = Coordinates::new(10.0, 20.0);

        provider.request_one_shot_location();
        provider.did_update_locations(&[Coordinates::new(0.0, 0.0), newest]);

        assert_eq!(recorder.seen(), vec![Seen::Fix(newest)]);
    }

    #[test]
    fn never_both_fix_and_error_for_one_request() {
        let (_, recorder, provider) = setup(AuthorizationStatus::AuthorizedAlways);

        provider.request_one_shot_location();
        provider.did_update_locations(&[Coordinates::new(1.0, 1.0)]);
        provider.did_fail(LocationError::Unavailable("late".into()));

        assert_eq!(recorder.seen(), vec![Seen::Fix(Coordinates::new(1.0, 1.0))]);
    }

    #[test]
    fn failure_is_forwarded_once() {
        let (_, recorder, provider) = setup(AuthorizationStatus::AuthorizedAlways);

        provider.request_one_shot_location();
        provider.did_fail(LocationError::Unavailable("no signal".into()));
        provider.did_update_locations(&[Coordinates::new(1.0, 1.0)]);

        assert_eq!(recorder.seen(), vec![Seen::Error(LocationError::Unavailable("no signal".into()))]);
    }

    #[test]
    fn denied_reports_error_without_platform_request() {
        let (source, recorder, provider) = setup(AuthorizationStatus::Denied);

        provider.request_one_shot_location();

        assert!(source.calls().is_empty());
        assert_eq!(recorder.seen(), vec![Seen::Error(LocationError::PermissionDenied)]);
    }

    #[test]
    fn updates_without_request_are_ignored() {
        let (source, recorder, provider) = setup(AuthorizationStatus::AuthorizedAlways);

        provider.did_update_locations(&[Coordinates::new(1.0, 1.0)]);

        assert!(recorder.seen().is_empty());
        assert!(source.calls().is_empty());
    }

    #[test]
    fn authorization_change_is_observed_but_does_not_request() {
        let (source, recorder, provider) = setup(AuthorizationStatus::NotDetermined);

        provider.did_change_authorization(AuthorizationStatus::AuthorizedWhenInUse);

        assert_eq!(provider.authorization(), AuthorizationStatus::AuthorizedWhenInUse);
        assert_eq!(recorder.seen(), vec![Seen::Authorization(AuthorizationStatus::AuthorizedWhenInUse)]);
        assert!(source.calls().is_empty());

        provider.request_one_shot_location();
        assert_eq!(source.calls(), vec![SourceCall::RequestLocation]);
    }

    #[test]
    fn pending_request_survives_permission_grant() {
        let (_, recorder, provider) = setup(AuthorizationStatus::NotDetermined);
        let fix = Coordinates::new(-8.05, -34.9);

        provider.request_one_shot_location();
        provider.did_change_authorization(AuthorizationStatus::AuthorizedWhenInUse);
        provider.did_update_locations(&[fix]);

        assert_eq!(
            recorder.seen(),
            vec![Seen::Authorization(AuthorizationStatus::AuthorizedWhenInUse), Seen::Fix(fix)]
        );
    }

    #[test]
    fn overlapping_requests_each_get_one_fix() {
        let (source, recorder, provider) = setup(AuthorizationStatus::AuthorizedAlways);
        let fix = Coordinates::new(-23.55, -46.63);

        provider.request_one_shot_location();
        provider.request_one_shot_location();
        provider.did_update_locations(&[fix]);
        provider.did_update_locations(&[Coordinates::new(5.0, 5.0)]);

        assert_eq!(recorder.seen(), vec![Seen::Fix(fix), Seen::Fix(fix)]);
        assert_eq!(
            source.calls(),
            vec![SourceCall::RequestLocation, SourceCall::RequestLocation, SourceCall::Stop]
        );
    }

    #[test]
    fn overlapping_requests_each_get_one_failure() {
        let (_, recorder, provider) = setup(AuthorizationStatus::AuthorizedWhenInUse);
        let error = LocationError::Unavailable("no signal".into());

        provider.request_one_shot_location();
        provider.request_one_shot_location();
        provider.did_fail(error.clone());
        provider.did_fail(error.clone());

        assert_eq!(recorder.seen(), vec![Seen::Error(error.clone()), Seen::Error(error)]);
    }

    #[test]
    fn pending_request_fails_when_permission_is_denied() {
        let (source, recorder, provider) = setup(AuthorizationStatus::NotDetermined);

        provider.request_one_shot_location();
        provider.did_change_authorization(AuthorizationStatus::Denied);
        provider.did_fail(LocationError::Unavailable("late".into()));
        provider.did_update_locations(&[Coordinates::new(1.0, 1.0)]);

        assert_eq!(
            recorder.seen(),
            vec![
                Seen::Authorization(AuthorizationStatus::Denied),
                Seen::Error(LocationError::PermissionDenied),
            ]
        );
        assert_eq!(
            source.calls(),
            vec![SourceCall::RequestLocation, SourceCall::RequestAuthorization, SourceCall::Stop]
        );
    }

    #[test]
    fn denial_without_pending_request_only_notifies() {
        let (source, recorder, provider) = setup(AuthorizationStatus::AuthorizedAlways);

        provider.did_change_authorization(AuthorizationStatus::Restricted);
        provider.request_one_shot_location();

        assert_eq!(
            recorder.seen(),
            vec![
                Seen::Authorization(AuthorizationStatus::Restricted),
                Seen::Error(LocationError::PermissionDenied),
            ]
        );
        assert!(source.calls().is_empty());
    }
}
