#![no_main]

use calltrace_core::{
    CallEvent, ErrorInfo, Formatter, LifecycleEvent, Policy, StackFrame, TemplateSet, Value,
};
use libfuzzer_sys::fuzz_target;

// Input layout: template, then a JSON document for the arguments, split at
// the first NUL byte.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (template, json) = text.split_once('\0').unwrap_or((text, "null"));
    let arg = serde_json::from_str::<serde_json::Value>(json)
        .map(Value::from)
        .unwrap_or_else(|_| Value::Text(json.to_string()));

    let mut templates = TemplateSet::default();
    for event in LifecycleEvent::ALL {
        templates = templates.with(event, template);
    }
    let formatter = Formatter::new(templates);

    let event = CallEvent::new("fuzz", vec![arg.clone(), Value::Array(vec![arg.clone()])])
        .with_elapsed_nanos(data.len() as u64);
    let failed = event.clone().failed(
        ErrorInfo::new("FuzzError", json).with_frame(StackFrame::new(template, 1)),
    );
    let returned = event.returned(arg);

    for policy in [Policy::default(), Policy::new().with_skip_arguments(true)] {
        for lifecycle in LifecycleEvent::ALL {
            let _ = formatter.format(lifecycle, &returned, &policy);
        }
        let _ = formatter.format_error(&failed, &policy);
    }
});
