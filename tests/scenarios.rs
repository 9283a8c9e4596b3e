//! End-to-end scenarios against a router built from two overlapping
//! configuration blocks sharing a domain, covering exact/prefix/regex
//! interplay, variable bindings, and domain-port normalization.

use waypoint_router::{LocationConf, MappingBlock, Router};

fn block(domains: &[&str], locations: &[&str]) -> MappingBlock {
    MappingBlock {
        domains: domains.iter().map(|s| s.to_string()).collect(),
        locations: locations.iter().map(|s| s.to_string()).collect(),
    }
}

fn base_configs() -> Vec<LocationConf<i32>> {
    vec![
        LocationConf {
            target: 1,
            blocks: vec![block(
                &[
                    "hotsoon.bytedance.com",
                    "hotsoon.toutiao.com",
                    "products.byted.org",
                ],
                &[
                    "= /api/video/info",
                    "/api/user",
                    "~ /api/video/detail/[0-9]+",
                    "/page/video/",
                    "/page/user/settings",
                    "/page/common",
                    "/info/:version/group/:group_id/",
                ],
            )],
        },
        LocationConf {
            target: 2,
            blocks: vec![block(
                &["neihan.bytedance.com", "products.byted.org", "api.neihan.com"],
                &["= /common/api/", "/page/post/", "~ /page/common/[0-9]+", "/admin"],
            )],
        },
    ]
}

#[test]
fn scenario_1_admin_only_hits_config_b() {
    let (router, errors) = Router::new(base_configs());
    assert!(errors.is_empty());

    let hits = router.get_all_targets("products.byted.org", "/admin/accounts/delete");
    let values: Vec<_> = hits.iter().map(|c| c.value).collect();
    assert_eq!(values, vec![2]);
}

#[test]
fn scenario_2_shared_domain_prefix_and_regex_both_hit() {
    let (router, _) = Router::new(base_configs());

    let mut hits: Vec<_> = router
        .get_all_targets("products.byted.org", "/page/common/1234")
        .into_iter()
        .map(|c| c.value)
        .collect();
    hits.sort();
    assert_eq!(hits, vec![1, 2]);
}

#[test]
fn scenario_3_regex_digit_class_excludes_non_digits() {
    let (router, _) = Router::new(base_configs());

    let hits = router.get_all_targets("products.byted.org", "/page/common/tt1234");
    let values: Vec<_> = hits.iter().map(|c| c.value).collect();
    assert_eq!(values, vec![1]);
}

#[test]
fn scenario_4_regex_hit_on_a_shared_domain() {
    // A domain shared across both configs where only one side defines a
    // regex location that matches: the target from that side wins.
    let mut configs = base_configs();
    configs.push(LocationConf {
        target: 1,
        blocks: vec![block(
            &["api.neihan.com"],
            &["~ /api/neihan/video/detail/[0-9]+"],
        )],
    });
    let (router, _) = Router::new(configs);

    let hit = router
        .get_target("api.neihan.com", "/api/neihan/video/detail/12345")
        .unwrap();
    assert_eq!(hit.value, 1);
}

#[test]
fn scenario_5_variable_bindings_are_captured() {
    let (router, _) = Router::new(base_configs());

    let hit = router
        .get_target("products.byted.org", "/info/4/group/12345/comments/")
        .unwrap();
    assert_eq!(hit.value, 1);
    assert_eq!(hit.bindings.get("version"), Some(&"4".to_string()));
    assert_eq!(hit.bindings.get("group_id"), Some(&"12345".to_string()));
}

#[test]
fn scenario_6_port_suffix_normalizes_onto_suffix_match() {
    let configs = vec![LocationConf {
        target: 9,
        blocks: vec![block(&["10.3.23.40"], &["/wenda/web/feed/brow/"])],
    }];
    let (router, _) = Router::new(configs);

    let hit = router
        .get_target("10.3.23.40:9009", "/wenda/web/feed/brow/")
        .unwrap();
    assert_eq!(hit.value, 9);
}

#[test]
fn exact_sigil_does_not_match_subpaths_across_the_whole_router() {
    let (router, _) = Router::new(base_configs());

    assert!(router
        .get_target("products.byted.org", "/api/video/info/extra")
        .is_none());
    assert!(router
        .get_target("products.byted.org", "/api/video/info")
        .is_some());
}
