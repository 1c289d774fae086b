// src/services/email.rs
//! Transactional mail templates and dispatch.
//!
//! Actual delivery is handled by the deployment's mail relay; this module
//! renders the HTML bodies and hands them to the outbox log.

use tracing::info;

use crate::common::safe_email_log;

pub fn verification_email(user_name: &str, verification_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #B3405A; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #B3405A; color: white; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Verify your email address</h1>
        </div>
        <div class="content">
            <p>Hi {},</p>

            <p>Thanks for creating an account. Please confirm your email address to activate it.</p>

            <p><a class="button" href="{}">Verify email</a></p>

            <p>If the button does not work, copy this link into your browser:<br>{}</p>

            <p>The link expires in 20 minutes. If you did not create an account, you can ignore this mail.</p>
        </div>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        user_name, verification_url, verification_url
    )
}

pub fn password_reset_email(user_name: &str, reset_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #B3405A; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 20px; background-color: #f9f9f9; }}
        .footer {{ padding: 20px; text-align: center; font-size: 12px; color: #666; }}
        .button {{ display: inline-block; padding: 12px 24px; background-color: #B3405A; color: white; text-decoration: none; border-radius: 5px; margin: 10px 0; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Password reset request</h1>
        </div>
        <div class="content">
            <p>Hi {},</p>

            <p>We received a request to reset the password on your account.</p>

            <p><a class="button" href="{}">Reset password</a></p>

            <p>The link expires in 20 minutes. If you did not request a reset, no action is needed.</p>
        </div>
        <div class="footer">
            <p>This is an automated message. Please do not reply directly to this email.</p>
        </div>
    </div>
</body>
</html>"#,
        user_name, reset_url
    )
}

/// Hand a rendered mail to the outbox
pub fn queue_email(to: &str, subject: &str, html_body: &str) {
    info!(
        to = %safe_email_log(to),
        subject = %subject,
        bytes = html_body.len(),
        "Email queued for delivery"
    );
}
