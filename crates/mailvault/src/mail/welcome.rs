//! Registration notification sent to the newly registered mailbox.
//!
//! The message goes from the mailbox to itself; delivering it proves the
//! submitted password is accepted by the relay, and hands the caller the
//! token a second time.

use super::OutboundMail;

pub const WELCOME_SUBJECT: &str = "Welcome to MailVault! 🎉";

/// Build the notification for a freshly derived `token`.
pub fn welcome_mail(email: &str, password: &str, token: &str, guide_url: &str) -> OutboundMail {
    let html_body = format!(
        "<html><body><h1>Hello! 👋</h1>\
         <p>This is a test message from <strong>MailVault</strong> 📧</p>\
         <p>If you are reading this, congratulations: your mailbox credentials work ✅.</p>\
         <p>Keep the token below somewhere safe. Every authenticated request needs it, \
         and it cannot be recovered.<br> Your token: <strong>{token}</strong> 🗝️</p>\
         <p>For details on how to use <strong>MailVault</strong>, see the guide:</p>\
         <p><a href='{guide_url}' target='_blank'>MailVault usage guide 📚</a></p>\
         </body></html>"
    );
    OutboundMail {
        from: email.to_owned(),
        from_password: password.to_owned(),
        to: email.to_owned(),
        subject: WELCOME_SUBJECT.to_owned(),
        html_body,
    }
}
