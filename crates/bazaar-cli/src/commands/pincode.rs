use bazaar_client::PincodeResolver;
use bazaar_client::pincode::is_valid_pincode;

use crate::cli::PincodeArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_pincode;

pub(crate) async fn handle(ctx: &mut AppContext, args: PincodeArgs) -> CliResult<()> {
    let pincode = args.pincode.trim();
    if !is_valid_pincode(pincode) {
        return Err(CliError::validation("PIN code must be 6 digits"));
    }
    let resolver = PincodeResolver::new(ctx.client().clone(), &ctx.config.pincode_base_url)?;
    let details = resolver.resolve(pincode).await?;
    render_pincode(&details, ctx.output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::context;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn resolves_state_and_district() -> Result<()> {
        let server = MockServer::start_async().await;
        let lookup = server.mock(|when, then| {
            when.method(GET).path("/pincode/110001");
            then.status(200).json_body(json!([{
                "Status": "Success",
                "PostOffice": [{"District": "Central Delhi", "State": "Delhi"}]
            }]));
        });
        let mut t = context(&server, None);
        handle(
            &mut t.ctx,
            PincodeArgs {
                pincode: " 110001 ".into(),
            },
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        lookup.assert();
        Ok(())
    }

    #[tokio::test]
    async fn unknown_code_is_a_failure() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/pincode/999999");
            then.status(200)
                .json_body(json!([{"Status": "Error", "PostOffice": null}]));
        });
        let mut t = context(&server, None);
        let err = handle(
            &mut t.ctx,
            PincodeArgs {
                pincode: "999999".into(),
            },
        )
        .await
        .expect_err("unknown code");
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn malformed_code_never_reaches_network() {
        let server = MockServer::start_async().await;
        let lookup = server.mock(|when, then| {
            when.method(GET).path("/pincode/12ab56");
            then.status(200);
        });
        let mut t = context(&server, None);
        let err = handle(
            &mut t.ctx,
            PincodeArgs {
                pincode: "12ab56".into(),
            },
        )
        .await
        .expect_err("malformed");
        assert_eq!(err.exit_code(), 2);
        lookup.assert_hits(0);
    }
}
