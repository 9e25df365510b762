/// Creates a single history [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use tomichat::{Role, tc_msg};
///
/// let message = tc_msg!(model => "Ngày xửa ngày xưa...");
/// assert_eq!(message.role, Role::Model);
/// assert_eq!(message.content, "Ngày xửa ngày xưa...");
/// ```
#[macro_export]
macro_rules! tc_msg {
    (user => $content:expr $(,)?) => {
        $crate::Message::user($content)
    };
    (model => $content:expr $(,)?) => {
        $crate::Message::model($content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use user or model");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use tomichat::{Role, tc_messages};
///
/// let messages = tc_messages![
///     user => "Kể một câu chuyện",
///     model => "Ngày xửa ngày xưa...",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[1].role, Role::Model);
/// ```
#[macro_export]
macro_rules! tc_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::tc_msg!($role => $content)),+]
    };
}
