#[cfg(feature = "tracing")]
macro_rules! ctrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "cellflow", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! ctrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! cdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "cellflow", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! cdebug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! cwarn {
    ($($tt:tt)*) => {
        tracing::warn!(target: "cellflow", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! cwarn {
    ($($tt:tt)*) => {};
}
