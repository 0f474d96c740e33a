pub mod client;
pub mod fixtures;
pub mod runner;
pub mod specs;

/// Invoke `$mac!(module::name)` for every E2E spec.
///
/// This is the **single source of truth** for the spec list. Adding a new spec
/// here registers it in `runner::run_all` and `tests/server.rs`.
#[macro_export]
macro_rules! for_each_spec {
    ($mac:ident) => {
        // health (1)
        $mac!(health::health_check);

        // auth (8)
        $mac!(auth::register_email);
        $mac!(auth::register_duplicate_email);
        $mac!(auth::register_bad_password);
        $mac!(auth::login);
        $mac!(auth::me_and_update_profile);
        $mac!(auth::refresh_token);
        $mac!(auth::logout);
        $mac!(auth::requires_bearer_token);

        // stores & onboarding (8)
        $mac!(stores::create_store_makes_primary);
        $mac!(stores::employee_joins_immediately);
        $mac!(stores::join_code_hidden_from_employees);
        $mac!(stores::manager_request_approval);
        $mac!(stores::rejected_manager_can_reapply);
        $mac!(stores::transfer_primary);
        $mac!(stores::members_can_leave);
        $mac!(stores::regenerate_join_code);

        // schedules & shifts (6)
        $mac!(schedules::create_schedule_snaps_to_week_start);
        $mac!(schedules::drafts_hidden_from_employees);
        $mac!(schedules::shift_validation);
        $mac!(schedules::week_view_flags);
        $mac!(schedules::week_view_hides_coworker_availability);
        $mac!(schedules::my_shifts_after_publish);

        // availability (3)
        $mac!(availability::upsert_replaces);
        $mac!(availability::unavailable_rejects_window);
        $mac!(availability::delete_record);
    };
}
