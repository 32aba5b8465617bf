//! Unit tests for subcommand handlers

#[cfg(test)]
mod tests {
    use crate::cli::Cli;
    use crate::commands::{dispatch, Outcome};
    use clap::Parser;
    use mrp_client::mock::*;
    use mrp_client::{ImageType, MrpError, PreseedType};
    use std::io::Write;

    fn lab_server() -> MockMrpServer {
        let server = MockMrpServer::new("http://test-mrp");
        server.add_machine(
            test_machine(42, "rig7"),
            vec![
                test_interface("eth0", "aa:bb:cc:dd:ee:00", None, None),
                test_interface("eth1", "aa:bb:cc:dd:ee:01", Some("10.0.0.5"), Some("255.255.255.0")),
            ],
        );
        server.add_image(test_image(100, "v5-arm64", ImageType::Kernel, "arm64"));
        server
    }

    async fn run(server: &MockMrpServer, args: &[&str]) -> anyhow::Result<Outcome> {
        let cli = Cli::try_parse_from(
            ["mrp", "--mrp-url", "http://test-mrp", "--mrp-token", "tok"]
                .iter()
                .chain(args),
        )
        .expect("arguments should parse");
        dispatch(&server.client(), cli.command).await
    }

    fn output(text: &str) -> Outcome {
        Outcome::Output(text.to_string())
    }

    #[tokio::test]
    async fn test_net_fields() {
        let server = lab_server();

        let ip = run(&server, &["net", "--machine", "rig7", "--field", "ip"]).await;
        let network = run(&server, &["net", "--machine", "rig7", "--field", "network"]).await;
        let mac = run(&server, &["ip", "--machine", "rig7", "--field", "mac"]).await;

        assert_eq!(ip.ok(), Some(output("10.0.0.5")));
        assert_eq!(network.ok(), Some(output("10.0.0.0/24")));
        assert_eq!(mac.ok(), Some(output("aa:bb:cc:dd:ee:01")));
    }

    #[tokio::test]
    async fn test_net_unconfigured_interface() {
        let server = lab_server();
        let eth0 = ["net", "--machine", "rig7", "--interface", "eth0", "--field"];

        let netmask = run(&server, &[&eth0[..], &["netmask"]].concat()).await;
        let ip = run(&server, &[&eth0[..], &["ip"]].concat()).await;
        let network = run(&server, &[&eth0[..], &["network"]].concat()).await;

        assert_eq!(netmask.ok(), Some(output("null")));
        assert_eq!(ip.ok(), Some(Outcome::Absent));
        assert_eq!(network.ok(), Some(Outcome::Absent));
    }

    #[tokio::test]
    async fn test_net_unknown_machine_fails() {
        let server = lab_server();

        let result = run(&server, &["net", "--machine", "rig8"]).await;

        let err = result.expect_err("unknown machine is an error");
        assert!(matches!(err.downcast_ref::<MrpError>(), Some(MrpError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_image_check() {
        let server = lab_server();
        let check = ["image", "check", "--image-type", "Kernel", "--arch", "arm64", "--description"];

        let present = run(&server, &[&check[..], &["v5-arm64"]].concat()).await;
        let absent = run(&server, &[&check[..], &["v6-arm64"]].concat()).await;

        assert_eq!(present.ok(), Some(output("True")));
        assert_eq!(absent.ok(), Some(Outcome::Absent));
        assert_eq!(server.write_count(), 0);
    }

    #[tokio::test]
    async fn test_preseed_upload_then_check() {
        let server = lab_server();
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"d-i foo\n").expect("write preseed");
        let path = file.path().to_string_lossy().into_owned();

        let upload = run(
            &server,
            &["preseed", "upload", "--name", "base", "--path", path.as_str(), "--public"],
        )
        .await
        .expect("upload");
        let check = run(&server, &["preseed", "check", "--name", "base"]).await;
        let wrong_type = run(
            &server,
            &["preseed", "check", "--name", "base", "--preseed-type", "kickstart"],
        )
        .await;

        assert!(matches!(upload, Outcome::Output(json) if json.contains("\"base\"")));
        assert_eq!(check.ok(), Some(output("True")));
        assert_eq!(wrong_type.ok(), Some(Outcome::Absent));
        let stored = server.preseeds();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].preseed_type, PreseedType::Preseed);
        assert_eq!(stored[0].public, Some(true));
    }

    #[tokio::test]
    async fn test_set_parameters_and_provision() {
        let server = lab_server();

        run(
            &server,
            &[
                "machine", "--machine", "rig7", "set-parameters", "--kernel", "v5-arm64", "--arch",
                "arm64", "--netboot", "0",
            ],
        )
        .await
        .expect("set-parameters");
        let provision = run(&server, &["state", "--machine", "rig7", "provision"]).await;
        server.clear_requests();
        let parameters = run(&server, &["machine", "--machine", "rig7", "get-parameters"])
            .await
            .expect("get-parameters");

        assert!(provision.is_ok());
        let fetches: Vec<_> = server
            .requests_with_method("GET")
            .into_iter()
            .filter(|request| request.path == "/api/v1/machine/42")
            .collect();
        assert_eq!(fetches.len(), 1);
        let Outcome::Output(json) = parameters else {
            panic!("expected parameters output");
        };
        let value: serde_json::Value = serde_json::from_str(&json).expect("JSON output");
        assert_eq!(
            value,
            serde_json::json!({"kernel_id": 100, "netboot_enabled": false, "state": "provision"})
        );
    }

    #[tokio::test]
    async fn test_provision_rejected_fails() {
        let server = lab_server();
        server.fail_with("POST", "/api/v1/machine/42/state", 400, "no kernel set");

        let result = run(&server, &["machine", "--machine", "rig7", "provision"]).await;

        let err = result.expect_err("rejection is an error");
        assert!(format!("{:#}", err).contains("no kernel set"));
    }
}
