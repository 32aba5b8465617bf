//! Unit tests for machine parameters and provisioning

#[cfg(test)]
mod tests {
    use crate::mock::*;
    use crate::{ImageType, MrpError, ParameterRequest, PreseedType, ProvisioningParameters};
    use serde_json::json;

    fn lab_server() -> MockMrpServer {
        let server = MockMrpServer::new("http://test-mrp");
        server.add_machine(test_machine(42, "rig7"), Vec::new());
        server.add_image(test_image(100, "v5-arm64", ImageType::Kernel, "arm64"));
        server.add_image(test_image(101, "v5-arm64-initrd", ImageType::Initrd, "arm64"));
        server.add_preseed(test_preseed(200, "debian-arm64", PreseedType::Preseed, "d-i\n"));
        server
    }

    #[tokio::test]
    async fn test_set_parameters_subarch_only_is_sparse() {
        let server = lab_server();
        let request = ParameterRequest {
            subarch: Some("efi".to_string()),
            kernel_description: Some(String::new()),
            initrd_description: Some(String::new()),
            ..Default::default()
        };

        server
            .client()
            .state()
            .set_machine_parameters(42, &request)
            .await
            .expect("set parameters");

        let requests = server.requests();
        assert_eq!(requests.len(), 1, "no lookups expected: {:?}", requests);
        assert_eq!(requests[0].method, "PUT");
        assert_eq!(requests[0].path, "/api/v1/machine/42");
        assert_eq!(
            requests[0].body,
            Some(json!({"subarch": "efi", "netboot_enabled": true}))
        );
    }

    #[tokio::test]
    async fn test_set_parameters_resolves_every_reference() {
        let server = lab_server();
        let request = ParameterRequest {
            preseed_name: Some("debian-arm64".to_string()),
            initrd_description: Some("v5-arm64-initrd".to_string()),
            kernel_description: Some("v5-arm64".to_string()),
            kernel_opts: Some("console=ttyAMA0".to_string()),
            arch: Some("arm64".to_string()),
            subarch: Some("efi".to_string()),
            netboot_enabled: None,
        };

        server
            .client()
            .state()
            .set_machine_parameters(42, &request)
            .await
            .expect("set parameters");

        let puts = server.requests_with_method("PUT");
        assert_eq!(puts.len(), 1);
        assert_eq!(
            puts[0].body,
            Some(json!({
                "initrd_id": 101,
                "kernel_id": 100,
                "preseed_id": 200,
                "subarch": "efi",
                "kernel_opts": "console=ttyAMA0",
                "netboot_enabled": true,
            }))
        );

        let machine = server.client().state().get_parameters(42).await.expect("get");
        assert_eq!(machine.id, 42);
        assert_eq!(
            machine.parameters(),
            ProvisioningParameters {
                initrd_id: Some(101),
                kernel_id: Some(100),
                preseed_id: Some(200),
                subarch: Some("efi".to_string()),
                kernel_opts: Some("console=ttyAMA0".to_string()),
                netboot_enabled: Some(true),
            }
        );
    }

    #[tokio::test]
    async fn test_set_parameters_explicit_netboot_false() {
        let server = lab_server();
        let request = ParameterRequest {
            netboot_enabled: Some(false),
            ..Default::default()
        };

        server
            .client()
            .state()
            .set_machine_parameters(42, &request)
            .await
            .expect("set parameters");

        assert_eq!(
            server.requests()[0].body,
            Some(json!({"netboot_enabled": false}))
        );
    }

    #[tokio::test]
    async fn test_set_parameters_unknown_preseed_sends_nothing() {
        let server = lab_server();
        let request = ParameterRequest {
            preseed_name: Some("ghost".to_string()),
            subarch: Some("efi".to_string()),
            ..Default::default()
        };

        let result = server
            .client()
            .state()
            .set_machine_parameters(42, &request)
            .await;

        assert!(matches!(result, Err(MrpError::UnknownPreseed(name)) if name == "ghost"));
        assert_eq!(server.write_count(), 0);
    }

    #[tokio::test]
    async fn test_set_parameters_missing_kernel_sends_nothing() {
        let server = lab_server();
        let request = ParameterRequest {
            initrd_description: Some("v5-arm64-initrd".to_string()),
            kernel_description: Some("v6-arm64".to_string()),
            arch: Some("arm64".to_string()),
            ..Default::default()
        };

        let result = server
            .client()
            .state()
            .set_machine_parameters(42, &request)
            .await;

        assert!(matches!(result, Err(MrpError::NotFound(msg)) if msg.contains("v6-arm64")));
        assert_eq!(server.write_count(), 0);
    }

    #[tokio::test]
    async fn test_set_parameters_image_without_arch() {
        let server = lab_server();
        let request = ParameterRequest {
            kernel_description: Some("v5-arm64".to_string()),
            ..Default::default()
        };

        let result = server
            .client()
            .state()
            .set_machine_parameters(42, &request)
            .await;

        assert!(matches!(result, Err(MrpError::InvalidArgument(_))));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_provision_machine_posts_state() {
        let server = lab_server();

        let ack = server
            .client()
            .state()
            .provision_machine(42)
            .await
            .expect("provision");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/api/v1/machine/42/state");
        assert_eq!(requests[0].body, Some(json!({"state": "provision"})));
        assert_eq!(ack, json!({"state": "provision"}));
        assert_eq!(
            server.machine(42).and_then(|m| m.extra.get("state").cloned()),
            Some(json!("provision"))
        );
    }

    #[tokio::test]
    async fn test_provision_machine_rejection_is_reported() {
        let server = lab_server();
        server.fail_with("POST", "/api/v1/machine/42/state", 400, "no kernel set");

        let result = server.client().state().provision_machine(42).await;

        match result {
            Err(MrpError::Status { status, body, method, .. }) => {
                assert_eq!(status, 400);
                assert_eq!(method, "POST");
                assert_eq!(body, "no kernel set");
            }
            other => panic!("expected Status error, got {:?}", other),
        }
        assert_eq!(server.requests_with_method("POST").len(), 1);
    }
}
