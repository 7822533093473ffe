use std::fmt::Write as _;

use bazaar_api_models::{ChangePasswordRequest, RegisterRequest};
use bazaar_client::pincode::is_valid_pincode;
use bazaar_client::{PincodeResolver, Route};
use serde_json::json;

use crate::cli::{
    AuthCommand, ChangePasswordArgs, LoginArgs, RegisterArgs, RouteArgs, UpdateProfileArgs,
    VerifyOtpArgs,
};
use crate::client::{AppContext, CliError, CliResult, resolve_secret};
use crate::output::{render, render_access, render_profile, render_with};

pub(crate) async fn handle(ctx: &mut AppContext, command: AuthCommand) -> CliResult<()> {
    match command {
        AuthCommand::Login(args) => handle_login(ctx, args).await,
        AuthCommand::Register(args) => handle_register(ctx, args).await,
        AuthCommand::VerifyOtp(args) => handle_verify_otp(ctx, args).await,
        AuthCommand::Logout => {
            ctx.session.logout()?;
            println!("Signed out.");
            Ok(())
        }
        AuthCommand::Profile => {
            ctx.require_token()?;
            let format = ctx.output;
            let user = ctx.session.load_profile().await?;
            render_profile(user, format)
        }
        AuthCommand::UpdateProfile(args) => handle_update_profile(ctx, args).await,
        AuthCommand::ChangePassword(args) => handle_change_password(ctx, args).await,
        AuthCommand::UploadImage(args) => {
            ctx.require_token()?;
            ctx.client().upload_profile_image(&args.path).await?;
            println!("Profile image uploaded.");
            Ok(())
        }
    }
}

async fn handle_login(ctx: &mut AppContext, args: LoginArgs) -> CliResult<()> {
    let email = args.email.trim();
    if email.is_empty() {
        return Err(CliError::validation("email must not be empty"));
    }
    let password = resolve_secret(args.password, "Password: ")?;
    let landing = ctx.session.login(email, &password).await?;
    let name = ctx.session.user().map(|user| user.display_name());
    let value = json!({ "landing": landing, "user": ctx.session.user() });
    render(ctx.output, &value, || match name {
        Some(name) => format!("signed in as {name} (landing: {landing})"),
        None => format!("signed in (landing: {landing})"),
    })
}

async fn handle_register(ctx: &mut AppContext, args: RegisterArgs) -> CliResult<()> {
    let pincode = args.pincode.trim().to_string();
    if !is_valid_pincode(&pincode) {
        return Err(CliError::validation("PIN code must be 6 digits"));
    }
    let (state, city) = match (args.state, args.city) {
        (Some(state), Some(city)) => (state, city),
        (state, city) => {
            let resolver = PincodeResolver::new(
                ctx.client().clone(),
                &ctx.config.pincode_base_url,
            )?;
            let details = resolver.resolve(&pincode).await?;
            (
                state.unwrap_or(details.state),
                city.unwrap_or(details.district),
            )
        }
    };
    let password = resolve_secret(args.password.clone(), "Password: ")?;
    let confirm_password = match (args.confirm_password, args.password) {
        (Some(confirm), _) => confirm,
        (None, Some(_)) => password.clone(),
        (None, None) => resolve_secret(None, "Confirm password: ")?,
    };
    let request = RegisterRequest {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email.trim().to_string(),
        phone_number: args.phone,
        gender: args.gender,
        pincode,
        state,
        city,
        password,
        confirm_password,
    };
    let response = ctx.session.register(&request).await?;
    render_with(ctx.output, &response, |out| {
        out.write_str(
            response
                .message
                .as_deref()
                .unwrap_or("Registration successful"),
        )?;
        if let Some(user_id) = &response.user_id {
            write!(
                out,
                "\nverify with: bazaar auth verify-otp --user-id {user_id} <code>"
            )?;
        }
        Ok(())
    })
}

async fn handle_verify_otp(ctx: &mut AppContext, args: VerifyOtpArgs) -> CliResult<()> {
    let landing = ctx.session.verify_otp(args.user_id.trim(), &args.otp).await?;
    render(ctx.output, &json!({ "landing": landing }), || {
        format!("account verified (landing: {landing})")
    })
}

async fn handle_update_profile(ctx: &mut AppContext, args: UpdateProfileArgs) -> CliResult<()> {
    ctx.require_token()?;
    if args.fields.is_empty() && args.image.is_none() {
        return Err(CliError::validation(
            "nothing to update (pass --field name=value or --image)",
        ));
    }
    ctx.client()
        .update_profile(&args.fields, args.image.as_deref())
        .await?;
    let format = ctx.output;
    let user = ctx.session.load_profile().await?;
    render_profile(user, format)
}

async fn handle_change_password(ctx: &mut AppContext, args: ChangePasswordArgs) -> CliResult<()> {
    ctx.require_token()?;
    let request = ChangePasswordRequest {
        old_password: resolve_secret(args.old_password, "Current password: ")?,
        new_password: resolve_secret(args.new_password, "New password: ")?,
    };
    ctx.client().change_password(&request).await?;
    println!("Password changed.");
    Ok(())
}

pub(crate) async fn handle_route(ctx: &mut AppContext, args: RouteArgs) -> CliResult<()> {
    let route = Route::resolve(&args.path);
    let access = ctx.session.authorize(&route).await;
    render_access(&route, &access, ctx.output)
}
