//! End-to-end resolution scenarios.

use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

use super::*;
use crate::constants::TNSNAMES_FILE_NAME;
use crate::types::{Protocol, ServerType};

fn fresh() -> ConnectParams {
    ConnectParams::new(Defaults::default())
}

fn with_aliases(contents: &str) -> (TempDir, ConnectParams) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(TNSNAMES_FILE_NAME), contents).unwrap();
    let params = ConnectParams::new(Defaults::default().with_config_dir(dir.path()));
    (dir, params)
}

// ═══════════════════════════════════════════════════════════════════════════
// Parsing and flattening
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_easy_connect_scalars() {
    let mut params = fresh();
    params.parse_connect_string("dbhost:1522/orclpdb").unwrap();
    assert_eq!(params.host(), OneOrMany::Scalar("dbhost".to_string()));
    assert_eq!(params.port(), OneOrMany::Scalar(1522));
    assert_eq!(
        params.service_name(),
        OneOrMany::Scalar(Some("orclpdb".to_string()))
    );
}

#[test]
fn test_tcps_easy_connect_round_trip() {
    let mut params = fresh();
    params
        .parse_connect_string("tcps://dbhost:2484/orcl.example.com?expire_time=2")
        .unwrap();

    let list = params.description_list().clone();
    assert_eq!(list.descriptions.len(), 1);
    assert_eq!(params.protocol(), OneOrMany::Scalar(Protocol::Tcps));
    assert_eq!(params.host(), OneOrMany::Scalar("dbhost".to_string()));
    assert_eq!(params.port(), OneOrMany::Scalar(2484));
    assert_eq!(
        params.service_name(),
        OneOrMany::Scalar(Some("orcl.example.com".to_string()))
    );
    assert_eq!(params.expire_time(), OneOrMany::Scalar(2));

    let mut reparsed = fresh();
    reparsed.parse_connect_string(&params.get_connect_string()).unwrap();
    assert_eq!(reparsed.description_list(), &list);
}

#[test]
fn test_multiple_descriptions_return_lists() {
    let mut params = fresh();
    params
        .parse_connect_string(
            "(DESCRIPTION_LIST=(LOAD_BALANCE=ON)\
               (DESCRIPTION=(ADDRESS=(HOST=a)(PORT=1))(CONNECT_DATA=(SERVICE_NAME=s1)))\
               (DESCRIPTION=(ADDRESS=(HOST=b)(PORT=2))(CONNECT_DATA=(SERVICE_NAME=s2)))\
               (DESCRIPTION=(ADDRESS=(HOST=c)(PORT=3))(CONNECT_DATA=(SERVICE_NAME=s3))))",
        )
        .unwrap();
    assert_eq!(
        params.service_name(),
        OneOrMany::List(vec![
            Some("s1".to_string()),
            Some("s2".to_string()),
            Some("s3".to_string())
        ])
    );
    assert_eq!(params.port(), OneOrMany::List(vec![1, 2, 3]));
    assert!(params.description_list().load_balance);
}

#[test]
fn test_address_list_with_two_addresses() {
    let mut params = fresh();
    params
        .parse_connect_string(
            "(DESCRIPTION=(ADDRESS_LIST=\
               (ADDRESS=(PROTOCOL=TCP)(HOST=h1)(PORT=1521))\
               (ADDRESS=(PROTOCOL=TCP)(HOST=h2)(PORT=1521)))\
             (CONNECT_DATA=(SERVICE_NAME=svc)))",
        )
        .unwrap();
    assert_eq!(
        params.host(),
        OneOrMany::List(vec!["h1".to_string(), "h2".to_string()])
    );
    assert_eq!(
        params.service_name(),
        OneOrMany::Scalar(Some("svc".to_string()))
    );
}

#[test]
fn test_descriptor_round_trip() {
    let mut params = fresh();
    params
        .parse_connect_string(
            "(DESCRIPTION_LIST=(FAILOVER=OFF)\
               (DESCRIPTION=(RETRY_COUNT=3)(TRANSPORT_CONNECT_TIMEOUT=250ms)\
                 (ADDRESS_LIST=(LOAD_BALANCE=ON)\
                   (ADDRESS=(PROTOCOL=TCPS)(HOST=a)(PORT=2484))\
                   (ADDRESS=(PROTOCOL=TCPS)(HOST=b)(PORT=2484)))\
                 (CONNECT_DATA=(SERVICE_NAME=svc)(SERVER=POOLED)(POOL_CONNECTION_CLASS=APP))\
                 (SECURITY=(SSL_SERVER_DN_MATCH=NO)(SSL_SERVER_CERT_DN=\"CN=db,O=Example\")))\
               (DESCRIPTION=(ADDRESS=(HOST=c)(PORT=1521))(CONNECT_DATA=(SID=ORCL))))",
        )
        .unwrap();

    let mut reparsed = fresh();
    reparsed.parse_connect_string(&params.get_connect_string()).unwrap();
    assert_eq!(reparsed.description_list(), params.description_list());
}

#[test]
fn test_quoted_easy_connect_value_round_trip() {
    let mut params = fresh();
    params
        .parse_connect_string("dbhost/svc?ssl_server_cert_dn=\"CN=db,O=Example\"")
        .unwrap();
    assert_eq!(
        params.ssl_server_cert_dn(),
        OneOrMany::Scalar(Some("CN=db,O=Example".to_string()))
    );

    let mut reparsed = fresh();
    reparsed.parse_connect_string(&params.get_connect_string()).unwrap();
    assert_eq!(reparsed.description_list(), params.description_list());
}

#[test]
fn test_double_quote_in_value_rejected() {
    let mut params = fresh();
    params.parse_connect_string("dbhost/svc").unwrap();
    let before = params.copy();

    let err = params
        .set(ParamsUpdate::new().ssl_server_cert_dn("CN=\"db\""))
        .unwrap_err();
    assert!(err.is_invalid_field_value());
    assert_eq!(err.field(), Some("ssl_server_cert_dn"));
    assert_eq!(params, before);

    params
        .set(ParamsUpdate::new().ssl_server_cert_dn("CN=db, O=Example Corp"))
        .unwrap();
    let mut reparsed = fresh();
    reparsed.parse_connect_string(&params.get_connect_string()).unwrap();
    assert_eq!(reparsed.description_list(), params.description_list());
}

#[test]
fn test_proxy_port_round_trip() {
    let mut params = fresh();
    params
        .parse_connect_string("dbhost/svc?https_proxy_port=8080")
        .unwrap();
    assert_eq!(params.https_proxy_port(), OneOrMany::Scalar(8080));

    let mut reparsed = fresh();
    reparsed.parse_connect_string(&params.get_connect_string()).unwrap();
    assert_eq!(reparsed.description_list(), params.description_list());
}

// ═══════════════════════════════════════════════════════════════════════════
// Precedence
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_precedence_alias_connect_string_set() {
    let (_dir, mut params) = with_aliases("PRIMARY = (DESCRIPTION=(ADDRESS=(HOST=h)(PORT=1))(CONNECT_DATA=(SERVICE_NAME=A)))\n");

    params.parse_connect_string("primary").unwrap();
    assert_eq!(params.service_name(), OneOrMany::Scalar(Some("A".to_string())));

    params.parse_connect_string("h/B").unwrap();
    assert_eq!(params.service_name(), OneOrMany::Scalar(Some("B".to_string())));

    params.set(ParamsUpdate::new().service_name("C")).unwrap();
    assert_eq!(params.service_name(), OneOrMany::Scalar(Some("C".to_string())));
}

#[test]
fn test_resolve_applies_sources_in_order() {
    let config = CloudConfig::from_json_str(
        r#"{"connect_descriptor": "cfg-host/cfg_svc", "user": "cfg_user",
            "pyo": {"stmtcachesize": 50, "retry_count": 4}}"#,
    )
    .unwrap();

    let params = ConnectParams::resolve(
        Defaults::default(),
        Sources {
            connect_string: Some("scott/tiger@dbhost/svc"),
            config: Some(&config),
            update: Some(ParamsUpdate::new().retry_count(9)),
        },
    )
    .unwrap();

    // The configuration descriptor replaces the connect string topology.
    assert_eq!(params.host(), OneOrMany::Scalar("cfg-host".to_string()));
    // Credentials from the connect string win over the configuration.
    assert_eq!(params.user(), Some("scott"));
    assert_eq!(params.password(), Some("tiger"));
    assert_eq!(params.stmtcachesize(), 50);
    assert_eq!(params.retry_count(), OneOrMany::Scalar(9));
}

#[test]
fn test_set_reaches_later_parses_through_templates() {
    let mut params = fresh();
    params
        .set(ParamsUpdate::new().retry_count(5).https_proxy("proxy"))
        .unwrap();
    params.parse_connect_string("h1,h2/svc").unwrap();

    assert_eq!(params.retry_count(), OneOrMany::Scalar(5));
    assert_eq!(
        params.https_proxy(),
        OneOrMany::List(vec![Some("proxy".to_string()), Some("proxy".to_string())])
    );
}

#[test]
fn test_set_applies_to_every_description_and_address() {
    let mut params = fresh();
    params
        .parse_connect_string(
            "(DESCRIPTION_LIST=\
               (DESCRIPTION=(ADDRESS=(HOST=a)(PORT=1))(ADDRESS=(HOST=b)(PORT=1)))\
               (DESCRIPTION=(ADDRESS=(HOST=c)(PORT=1))))",
        )
        .unwrap();
    params
        .set(ParamsUpdate::new().port(2000).server_type(ServerType::Dedicated))
        .unwrap();

    assert_eq!(params.port(), OneOrMany::List(vec![2000, 2000, 2000]));
    assert_eq!(
        params.server_type(),
        OneOrMany::List(vec![Some(ServerType::Dedicated); 2])
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Validation and atomicity
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_edition_and_cclass_conflict() {
    let mut params = fresh();
    let err = params
        .set(ParamsUpdate::new().edition("E1").cclass("C1"))
        .unwrap_err();
    assert!(err.is_config_conflict());
}

#[test]
fn test_conflict_with_parsed_cclass() {
    let mut params = fresh();
    params.set(ParamsUpdate::new().edition("E1")).unwrap();
    let before = params.copy();

    let err = params
        .parse_connect_string("dbhost/svc?pool_connection_class=APP")
        .unwrap_err();
    assert!(err.is_config_conflict());
    assert_eq!(params, before);
}

#[test]
fn test_failed_set_leaves_instance_unchanged() {
    let mut params = fresh();
    params.parse_connect_string("dbhost/svc").unwrap();
    let before = params.copy();

    let err = params
        .set(ParamsUpdate::new().retry_count(7).tcp_connect_timeout(-1.0))
        .unwrap_err();
    assert!(err.is_invalid_field_value());
    assert_eq!(params, before);
    assert_eq!(params.retry_count(), OneOrMany::Scalar(0));
}

#[test]
fn test_failed_parse_leaves_instance_unchanged() {
    let mut params = fresh();
    params.parse_connect_string("dbhost/svc").unwrap();
    let before = params.copy();

    assert!(params.parse_connect_string("(DESCRIPTION=(ADDRESS=").is_err());
    assert_eq!(params, before);
}

#[test]
fn test_copy_is_independent() {
    let mut original = fresh();
    original.parse_connect_string("dbhost/svc").unwrap();
    let mut copy = original.copy();
    copy.set(ParamsUpdate::new().host("other").service_name("x"))
        .unwrap();

    assert_eq!(original.host(), OneOrMany::Scalar("dbhost".to_string()));
    assert_eq!(copy.host(), OneOrMany::Scalar("other".to_string()));
}

#[test]
fn test_set_named() {
    let mut params = fresh();
    params.set_named("expire_time", "3").unwrap();
    assert_eq!(params.expire_time(), OneOrMany::Scalar(3));

    let err = params.set_named("no_such_param", "1").unwrap_err();
    assert!(err.is_invalid_field_value());
}

// ═══════════════════════════════════════════════════════════════════════════
// Credentials
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_user_with_proxy() {
    let mut params = fresh();
    params.set(ParamsUpdate::new().user("app[batch]")).unwrap();
    assert_eq!(params.user(), Some("app"));
    assert_eq!(params.proxy_user(), Some("batch"));

    params
        .set(ParamsUpdate::new().user("app[ignored]").proxy_user("explicit"))
        .unwrap();
    assert_eq!(params.proxy_user(), Some("explicit"));
}

#[test]
fn test_parse_dsn_with_credentials() {
    let mut params = fresh();
    params.parse_dsn_with_credentials("scott/tiger@dbhost/svc").unwrap();
    assert_eq!(params.user(), Some("scott"));
    assert_eq!(params.password(), Some("tiger"));
    assert_eq!(params.host(), OneOrMany::Scalar("dbhost".to_string()));
}

#[test]
fn test_debug_hides_passwords() {
    let mut params = fresh();
    params
        .set(ParamsUpdate::new().password("tiger").wallet_password("w4llet"))
        .unwrap();
    let debug_str = format!("{params:?}");
    assert!(!debug_str.contains("tiger"));
    assert!(!debug_str.contains("w4llet"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Configuration objects
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_config_user_only_when_unset() {
    let config = CloudConfig::from_json_str(
        r#"{"user": "cfg_user", "password": {"type": "text", "value": "cfg_pw"}}"#,
    )
    .unwrap();

    let mut params = fresh();
    params.set(ParamsUpdate::new().user("scott")).unwrap();
    params.set_from_config(&config).unwrap();
    assert_eq!(params.user(), Some("scott"));
    assert_eq!(params.password(), Some("cfg_pw"));
}

#[test]
fn test_config_pyo_values_and_unknown_keys() {
    let config = CloudConfig {
        pyo: [
            ("program".to_string(), json!("etl")),
            ("shardingkey".to_string(), json!(["eu", 1])),
            ("not_a_param".to_string(), json!(1)),
        ]
        .into_iter()
        .collect(),
        ..CloudConfig::default()
    };

    let mut params = fresh();
    params.set_from_config(&config).unwrap();
    assert_eq!(params.program(), "etl");
    assert_eq!(
        params.shardingkey(),
        [ShardingValue::Text("eu".into()), ShardingValue::Integer(1)]
    );
}

#[test]
fn test_config_unsupported_password_type() {
    let config =
        CloudConfig::from_json_str(r#"{"password": {"type": "vault", "value": "ocid"}}"#)
            .unwrap();
    let mut params = fresh();
    let err = params.set_from_config(&config).unwrap_err();
    assert!(err.is_config());
    assert!(params.password().is_none());
}

#[test]
fn test_config_with_custom_resolver() {
    struct Reverse;
    impl SecretResolver for Reverse {
        fn resolve(&self, _kind: &str, value: &str) -> Result<String> {
            Ok(value.chars().rev().collect())
        }
    }

    let config =
        CloudConfig::from_json_str(r#"{"password": {"type": "vault", "value": "regit"}}"#)
            .unwrap();
    let mut params = fresh();
    params.set_from_config_with(&config, &Reverse).unwrap();
    assert_eq!(params.password(), Some("tiger"));
}

// ═══════════════════════════════════════════════════════════════════════════
// Aliases
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_alias_lookup_is_case_insensitive() {
    let (_dir, mut params) = with_aliases("SalesDB = sales-host:1600/sales\n");
    params.parse_connect_string("SALESDB").unwrap();
    assert_eq!(params.port(), OneOrMany::Scalar(1600));

    params.parse_connect_string("salesdb").unwrap();
    assert_eq!(params.host(), OneOrMany::Scalar("sales-host".to_string()));
}

#[test]
fn test_alias_with_credentials() {
    let (_dir, mut params) = with_aliases("SALES = sales-host/sales\n");
    params.parse_connect_string("scott/tiger@sales").unwrap();
    assert_eq!(params.user(), Some("scott"));
    assert_eq!(params.host(), OneOrMany::Scalar("sales-host".to_string()));
}

#[test]
fn test_alias_cycle_is_parse_error() {
    let (_dir, mut params) = with_aliases("A = b\nB = a\n");
    let err = params.parse_connect_string("a").unwrap_err();
    assert!(err.is_parse());
}

#[test]
fn test_ifile_alias() {
    let (dir, mut params) = with_aliases("IFILE = extra.ora\n");
    fs::write(dir.path().join("extra.ora"), "EXTRA = extra-host/svc\n").unwrap();
    params.parse_connect_string("extra").unwrap();
    assert_eq!(params.host(), OneOrMany::Scalar("extra-host".to_string()));
}

#[test]
fn test_get_network_service_names() {
    let (_dir, params) = with_aliases("b = h/s\nA, c = h/s\n");
    assert_eq!(params.get_network_service_names().unwrap(), ["B", "A", "C"]);
}

#[test]
fn test_get_network_service_names_without_file() {
    let dir = TempDir::new().unwrap();
    let params = ConnectParams::new(Defaults::default().with_config_dir(dir.path()));
    assert!(params.get_network_service_names().unwrap_err().is_alias_not_found());
    assert!(fresh().get_network_service_names().unwrap_err().is_alias_not_found());
}

#[test]
fn test_config_dir_from_update_drives_alias_lookup() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(TNSNAMES_FILE_NAME), "PRIMARY = p-host/svc\n").unwrap();

    let params = ConnectParams::resolve(
        Defaults::default(),
        Sources {
            connect_string: Some("primary"),
            update: Some(ParamsUpdate::new().config_dir(dir.path())),
            ..Sources::default()
        },
    )
    .unwrap();
    assert_eq!(params.host(), OneOrMany::Scalar("p-host".to_string()));
    assert_eq!(params.config_dir(), Some(dir.path()));
}

// ═══════════════════════════════════════════════════════════════════════════
// Driver modes
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_ignored_fields() {
    let mut params = fresh();
    params
        .set(
            ParamsUpdate::new()
                .wallet_password("w")
                .tag("t")
                .use_tcp_fast_open(true),
        )
        .unwrap();

    assert_eq!(params.ignored_fields(DriverMode::Thin), [ParamName::Tag]);
    assert_eq!(
        params.ignored_fields(DriverMode::Thick),
        [ParamName::WalletPassword, ParamName::UseTcpFastOpen]
    );
}

#[test]
fn test_defaults_are_not_reported_as_ignored() {
    let params = ConnectParams::new(
        Defaults::default()
            .with_config_dir(Path::new("/etc/tns"))
            .with_stmtcachesize(10),
    );
    assert!(params.ignored_fields(DriverMode::Thick).is_empty());
    assert_eq!(params.stmtcachesize(), 10);
}

#[test]
fn test_easy_connect_driver_options() {
    let mut params = fresh();
    params
        .parse_connect_string("dbhost/svc?pyo.stmtcachesize=30&pyo.events=on")
        .unwrap();
    assert_eq!(params.stmtcachesize(), 30);
    assert!(params.events());
}
