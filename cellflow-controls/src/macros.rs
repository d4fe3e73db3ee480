#[cfg(feature = "tracing")]
macro_rules! ctrace {
    ($($tt:tt)*) => {
        tracing::trace!(target: "cellflow_controls", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! ctrace {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! cdebug {
    ($($tt:tt)*) => {
        tracing::debug!(target: "cellflow_controls", $($tt)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! cdebug {
    ($($tt:tt)*) => {};
}
