// ==========================================
// Row validation behavior tests
// ==========================================
// Field-level rules as seen through the import API: type/subtype
// immutability, u_size normalization, priority parsing, power links,
// groups, RC-0 handling, ext-attribute sanitation.
// ==========================================

mod helpers;

use asset_inventory::api::{AssetApi, ImportApi};
use asset_inventory::domain::types::AssetStatus;
use helpers::{import, row, row_error, row_id, setup_repo};
use std::sync::Arc;

const HEADER: &str = "name,type,sub_type,location,status,priority";

#[test]
fn test_type_change_on_update_is_rejected() {
    let repo = setup_repo();
    let first = import(&repo, &format!("{}\nbox-1,rack,N_A,,active,P3\n", HEADER));
    let name = row(&first, 1).name.clone().unwrap();

    let second = import(
        &repo,
        &format!("id,{}\n{},box-1,room,N_A,,active,P3\n", HEADER, name),
    );
    assert!(row_error(&second, 1).contains("type"));
}

#[test]
fn test_subtype_change_on_update_is_rejected_unless_na() {
    let repo = setup_repo();
    let first = import(
        &repo,
        &format!("{}\nsrv-x,device,server,,active,P3\n", HEADER),
    );
    let name = row(&first, 1).name.clone().unwrap();

    // server -> ups is a forbidden subtype change
    let second = import(
        &repo,
        &format!("id,{}\n{},srv-x,device,ups,,active,P3\n", HEADER, name),
    );
    assert!(row_error(&second, 1).contains("sub_type"));

    // unchanged subtype with new ext attributes succeeds
    let third = import(
        &repo,
        &format!(
            "id,{},description\n{},srv-x,device,server,,active,P3,front row\n",
            HEADER, name
        ),
    );
    assert_eq!(third.updated, 1);
    let api = AssetApi::new(Arc::clone(&repo));
    let element = api.get_asset(row_id(&third, 1)).unwrap();
    assert_eq!(element.ext["description"].value, "front row");
}

#[test]
fn test_u_size_normalization() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "{},u_size\nrack-a,rack,N_A,,active,P3,42U\nrack-b,rack,N_A,,active,P3,05\nrack-c,rack,N_A,,active,P3,53\nrack-d,rack,N_A,,active,P3,abc\n",
            HEADER
        ),
    );

    let api = AssetApi::new(Arc::clone(&repo));
    assert_eq!(
        api.get_asset(row_id(&response, 1)).unwrap().ext["u_size"].value,
        "42"
    );
    assert_eq!(
        api.get_asset(row_id(&response, 2)).unwrap().ext["u_size"].value,
        "5"
    );
    // out of [1, 52] fails the row
    assert!(row_error(&response, 3).contains("u_size"));
    // non-matching pattern is dropped, not an error
    let rack_d = api.get_asset(row_id(&response, 4)).unwrap();
    assert!(!rack_d.ext.contains_key("u_size"));
}

#[test]
fn test_location_u_pos_requires_unsigned_in_range() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "{},location_u_pos\nrack-p,rack,N_A,,active,P3,abc\n",
            HEADER
        ),
    );
    assert!(row_error(&response, 1).contains("location_u_pos"));
}

#[test]
fn test_priority_defaults_to_five() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!("{}\nr-p0,room,N_A,,active,\nr-p9,room,N_A,,active,P9\nr-long,room,N_A,,active,P12\n", HEADER),
    );
    let api = AssetApi::new(Arc::clone(&repo));
    for index in 1..=3 {
        assert_eq!(api.get_asset(row_id(&response, index)).unwrap().priority, 5);
    }
}

#[test]
fn test_invalid_status_and_type() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!("{}\nbad-s,room,N_A,,sleeping,P1\nbad-t,shelf,N_A,,active,P1\n", HEADER),
    );
    assert!(row_error(&response, 1).contains("status"));
    assert!(row_error(&response, 2).contains("type"));
}

#[test]
fn test_power_links_resolved_and_truncated() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "{h},power_source.1,power_plug_src.1,power_input.1\nups-1,device,ups,,active,P2,,,\nsrv-1,device,server,,active,P2,ups-1,OUT15,IN3\n",
            h = HEADER
        ),
    );
    assert_eq!(response.imported, 2);

    let ups_id = row_id(&response, 1);
    let srv_id = row_id(&response, 2);
    let links = repo.select_power_links_to(srv_id).unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].0, ups_id);
    // outlet codes are cut to four characters
    assert_eq!(links[0].1.as_deref(), Some("OUT1"));
    assert_eq!(links[0].2.as_deref(), Some("IN3"));
}

#[test]
fn test_self_referencing_power_source_is_dropped() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "{h},power_source.1\nsrv-loop,device,server,,active,P2,srv-loop\n",
            h = HEADER
        ),
    );
    assert_eq!(response.imported, 1);
    assert!(repo
        .select_power_links_to(row_id(&response, 1))
        .unwrap()
        .is_empty());
}

#[test]
fn test_power_links_on_non_device_are_dropped_with_warning() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "{h},power_source.1\nups-2,device,ups,,active,P2,\nroom-z,room,N_A,,active,P2,ups-2\n",
            h = HEADER
        ),
    );
    assert_eq!(response.imported, 2);
    assert!(repo
        .select_power_links_to(row_id(&response, 2))
        .unwrap()
        .is_empty());
}

#[test]
fn test_groups_probe_until_absent_column() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "{h},group.1,group.2\ngrp-a,group,storage,,active,P3,,\ngrp-b,group,storage,,active,P3,,\nsrv-g,device,server,,active,P3,grp-a,grp-b\n",
            h = HEADER
        ),
    );
    assert_eq!(response.imported, 3);

    // group kind is stored as the ext attribute "type"
    let api = AssetApi::new(Arc::clone(&repo));
    let group = api.get_asset(row_id(&response, 1)).unwrap();
    assert_eq!(group.ext["type"].value, "storage");
}

#[test]
fn test_unknown_group_fails_row() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!("{h},group.1\nsrv-o,device,server,,active,P3,nosuch\n", h = HEADER),
    );
    assert!(row_error(&response, 1).contains("not found"));
}

#[test]
fn test_date_ext_attributes_validated() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "{h},warranty_end,install_date\nsrv-d,device,server,,active,P3,2027-06-30,31.12.2026\nsrv-e,device,server,,active,P3,someday,\n",
            h = HEADER
        ),
    );
    let api = AssetApi::new(Arc::clone(&repo));
    let element = api.get_asset(row_id(&response, 1)).unwrap();
    assert_eq!(element.ext["warranty_end"].value, "2027-06-30");
    assert_eq!(element.ext["install_date"].value, "31.12.2026");

    assert!(row_error(&response, 2).contains("warranty_end"));
}

#[test]
fn test_numeric_ext_attributes_validated() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "{h},max_power,calibration_offset_t\nsrv-n,device,server,,active,P3,-5,\nsrv-m,device,server,,active,P3,120.5,-0.4\n",
            h = HEADER
        ),
    );
    assert!(row_error(&response, 1).contains("max_power"));

    let api = AssetApi::new(Arc::clone(&repo));
    let element = api.get_asset(row_id(&response, 2)).unwrap();
    assert_eq!(element.ext["max_power"].value, "120.5");
    assert_eq!(element.ext["calibration_offset_t"].value, "-0.4");
}

#[test]
fn test_logical_asset_must_exist() {
    let repo = setup_repo();
    import(&repo, &format!("{}\nrack-l,rack,N_A,,active,P3\n", HEADER));

    let response = import(
        &repo,
        &format!(
            "{h},logical_asset\nsen-1,device,sensor,,active,P3,rack-l\nsen-2,device,sensor,,active,P3,missing\n",
            h = HEADER
        ),
    );
    let api = AssetApi::new(Arc::clone(&repo));
    let sensor = api.get_asset(row_id(&response, 1)).unwrap();
    assert_eq!(sensor.ext["logical_asset"].value, "rack-l");
    assert!(row_error(&response, 2).contains("not found"));
}

#[test]
fn test_second_rc0_claimant_is_demoted() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!(
            "id,{h},serial_no,description\nrackcontroller-0,rc-self,device,rackcontroller,,active,P1,SN-1,self\nrackcontroller-0,rc-copy,device,rackcontroller,,active,P1,SN-2,copy\n",
            h = HEADER
        ),
    );
    assert_eq!(response.imported, 2);

    let api = AssetApi::new(Arc::clone(&repo));
    // the first claimant is the canonical self
    let self_rc = api.get_asset(row_id(&response, 1)).unwrap();
    assert_eq!(self_rc.name, "rackcontroller-0");
    assert_eq!(self_rc.ext["serial_no"].value, "SN-1");
    assert_eq!(self_rc.status, AssetStatus::Active);

    // the second claimant becomes a plain asset, hardware columns suppressed
    let demoted = api.get_asset(row_id(&response, 2)).unwrap();
    assert_eq!(demoted.name, "rc-copy");
    assert!(!demoted.ext.contains_key("serial_no"));
    assert_eq!(demoted.ext["description"].value, "copy");
}

#[test]
fn test_name_sanitation_and_length() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!("{}\nMain Rack #1,rack,N_A,,active,P3\n", HEADER),
    );
    let api = AssetApi::new(Arc::clone(&repo));
    let element = api.get_asset(row_id(&response, 1)).unwrap();
    assert_eq!(element.name, "Main_Rack_1");
    // the user-facing name is preserved as an ext attribute
    assert_eq!(element.ext["name"].value, "Main Rack #1");

    let long_name = "x".repeat(51);
    let too_long = import(
        &repo,
        &format!("{}\n{},rack,N_A,,active,P3\n", HEADER, long_name),
    );
    assert!(row_error(&too_long, 1).contains("50"));
}

#[test]
fn test_length_limits_count_characters_not_bytes() {
    let repo = setup_repo();
    let api = ImportApi::new(Arc::clone(&repo)).with_sanitize_names(false);

    // 50 two-byte characters are within the limit
    let name = "é".repeat(50);
    let tag = "ü".repeat(50);
    let response = api
        .import_csv(
            &format!("{h},asset_tag\n{n},room,N_A,,active,P1,{t}\n", h = HEADER, n = name, t = tag),
            "tester",
        )
        .unwrap();
    assert_eq!(response.imported, 1);

    let long = "é".repeat(51);
    let too_long = api
        .import_csv(&format!("{}\n{},room,N_A,,active,P1\n", HEADER, long), "tester")
        .unwrap();
    assert!(row_error(&too_long, 1).contains("50"));
}

#[test]
fn test_device_requires_known_subtype() {
    let repo = setup_repo();
    let response = import(
        &repo,
        &format!("{}\ndev-a,device,,,active,P3\ndev-b,device,blade,,active,P3\ndev-c,device,rc3,,active,P3\n", HEADER),
    );
    assert!(row_error(&response, 1).contains("sub_type"));
    assert!(row_error(&response, 2).contains("sub_type"));
    // synonym resolves to the rack-controller subtype
    assert!(row(&response, 3).asset_id.is_some());
}
