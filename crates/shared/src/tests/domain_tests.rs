use super::*;

#[test]
fn permission_level_round_trips_through_display_and_parse() {
    for level in PermissionLevel::ALL {
        assert_eq!(level.as_str().parse::<PermissionLevel>().unwrap(), level);
    }
}

#[test]
fn permission_level_rejects_unknown_names() {
    let err = "admin".parse::<PermissionLevel>().unwrap_err();
    assert!(err.to_string().contains("admin"));
}

#[test]
fn server_state_collapses_unrecognized_values() {
    assert_eq!(ServerState::from_wire("running"), ServerState::Running);
    assert_eq!(ServerState::from_wire("stopped"), ServerState::Stopped);
    assert_eq!(ServerState::from_wire("restarting"), ServerState::Unknown);
    assert_eq!(ServerState::from_wire(""), ServerState::Unknown);
}

#[test]
fn server_state_deserializes_from_json_string() {
    let state: ServerState = serde_json::from_str("\"running\"").unwrap();
    assert!(state.is_running());

    let state: ServerState = serde_json::from_str("\"halted\"").unwrap();
    assert_eq!(state, ServerState::Unknown);
}

#[test]
fn download_state_in_flight_covers_download_and_extraction_only() {
    assert!(DownloadState::from_wire("downloading").is_in_flight());
    assert!(DownloadState::from_wire("extracting").is_in_flight());
    assert!(!DownloadState::from_wire("completed").is_in_flight());
    assert!(!DownloadState::from_wire("error").is_in_flight());
    assert!(!DownloadState::from_wire("starting").is_in_flight());
}

#[test]
fn xuid_serializes_transparently() {
    let xuid = Xuid::from("2535428450842000");
    assert_eq!(
        serde_json::to_string(&xuid).unwrap(),
        "\"2535428450842000\""
    );
}
