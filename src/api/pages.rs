//! Server-rendered HTML views.
//!
//! Four self-contained pages (no external assets, no build step):
//! - `/`          — medication dashboard
//! - `/scanner`   — label upload and add-medication form
//! - `/shop`      — refill catalog and mock cart
//! - `/reminders` — daily dose checklist
//!
//! Pages fetch and mutate data through the JSON API under `/api/` with
//! small inline scripts, then reload. Render failures fall back to a
//! standalone fault page so the browser never sees a bare error string.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::api::types::ApiContext;
use crate::cart::{format_cents, CartView};
use crate::config;
use crate::models::{MedicationRecord, FREQUENCY_OPTIONS};
use crate::schedule::ScheduleEntry;

// ═══════════════════════════════════════════════════════════
// Handlers
// ═══════════════════════════════════════════════════════════

pub async fn home(State(ctx): State<ApiContext>) -> Response {
    match ctx.core.medications() {
        Ok(meds) => Html(render_home_page(&meds)).into_response(),
        Err(e) => fault_response(&e.to_string()),
    }
}

pub async fn scanner() -> Html<String> {
    Html(render_scanner_page())
}

pub async fn shop(State(ctx): State<ApiContext>) -> Response {
    let meds = match ctx.core.medications() {
        Ok(meds) => meds,
        Err(e) => return fault_response(&e.to_string()),
    };
    let cart = match ctx.core.cart_view() {
        Ok(cart) => cart,
        Err(e) => return fault_response(&e.to_string()),
    };
    Html(render_shop_page(&meds, &cart)).into_response()
}

pub async fn reminders(State(ctx): State<ApiContext>) -> Response {
    match ctx.core.schedule_entries() {
        Ok(entries) => Html(render_reminders_page(&entries)).into_response(),
        Err(e) => fault_response(&e.to_string()),
    }
}

fn fault_response(detail: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(render_fault_page(detail)),
    )
        .into_response()
}

// ═══════════════════════════════════════════════════════════
// Page shell
// ═══════════════════════════════════════════════════════════

const NAV_TABS: [(&str, &str); 4] = [
    ("/", "Medications"),
    ("/scanner", "Scanner"),
    ("/shop", "Shop"),
    ("/reminders", "Reminders"),
];

/// Wrap page content in the shared chrome: header, styles, tab bar.
///
/// `script` is inserted verbatim inside a `<script>` tag; pass `""`
/// for static pages.
fn render_shell(title: &str, active_path: &str, content: &str, script: &str) -> String {
    let nav = NAV_TABS
        .iter()
        .map(|(path, label)| {
            let class = if *path == active_path { r#" class="active""# } else { "" };
            format!(r#"<a href="{path}"{class}>{label}</a>"#)
        })
        .collect::<String>();

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · {app_name}</title>
<style>
*,*::before,*::after{{box-sizing:border-box}}
body{{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#fafaf9;color:#1c1917;padding-bottom:72px}}
.topbar{{background:#fff;border-bottom:1px solid #e7e5e4;padding:14px 20px;font-weight:700;color:#2563eb}}
.page{{max-width:520px;margin:0 auto;padding:20px}}
h1{{font-size:1.35rem;margin:0 0 4px}}
h2{{font-size:1rem;margin:0 0 12px}}
.subtitle{{color:#78716c;font-size:.9rem;margin:0 0 20px}}
.card{{background:#fff;border-radius:14px;box-shadow:0 2px 10px rgba(0,0,0,.05);padding:18px;margin-bottom:14px}}
.card.empty{{color:#78716c;text-align:center;font-size:.9rem}}
.card-row{{display:flex;justify-content:space-between;align-items:center;gap:12px}}
.muted{{color:#78716c;font-size:.85rem;margin:6px 0}}
.badge{{background:#eff6ff;color:#2563eb;border-radius:999px;padding:3px 10px;font-size:.75rem;font-weight:600;white-space:nowrap}}
.badge-warn{{background:#fef2f2;color:#dc2626}}
.btn{{display:inline-block;border:none;border-radius:10px;padding:11px 16px;font-size:.9rem;font-weight:600;cursor:pointer;text-decoration:none;text-align:center;transition:transform .1s}}
.btn:active{{transform:scale(.97)}}
.btn:disabled{{opacity:.5;cursor:default}}
.btn-primary{{background:#2563eb;color:#fff}}
.btn-secondary{{background:#e7e5e4;color:#1c1917}}
.btn-block{{display:block;width:100%}}
.btn-link{{background:none;border:none;color:#dc2626;font-size:.8rem;cursor:pointer;padding:4px}}
.field{{display:block;font-size:.8rem;font-weight:600;color:#44403c;margin-bottom:12px}}
.field input,.field select{{display:block;width:100%;margin-top:4px;padding:10px;border:1px solid #d6d3d1;border-radius:8px;font-size:.95rem;font-weight:400;background:#fff}}
.error{{background:#fef2f2;color:#dc2626;border-radius:8px;padding:10px;font-size:.85rem;margin-top:12px}}
.hidden{{display:none}}
.time{{display:inline-block;background:#f5f5f4;border-radius:6px;padding:2px 8px;font-size:.75rem;font-weight:700;color:#57534e;margin-bottom:4px}}
.list-row{{display:flex;justify-content:space-between;align-items:center;gap:12px;padding:10px 0;border-bottom:1px solid #f5f5f4}}
.list-row:last-of-type{{border-bottom:none}}
.total-row{{border-top:1px solid #e7e5e4;padding-top:12px;margin-top:4px;font-size:1.05rem}}
.price{{font-weight:700}}
.row-taken strong,.row-taken .muted{{text-decoration:line-through;color:#a8a29e}}
.tabs{{position:fixed;bottom:0;left:0;right:0;display:flex;background:#fff;border-top:1px solid #e7e5e4}}
.tabs a{{flex:1;text-align:center;padding:14px 4px;font-size:.8rem;color:#78716c;text-decoration:none}}
.tabs a.active{{color:#2563eb;font-weight:700}}
</style>
</head>
<body>
<header class="topbar">{app_name}</header>
<main class="page">
{content}
</main>
<nav class="tabs">{nav}</nav>
<script>
{script}
</script>
</body>
</html>"##,
        title = title,
        app_name = config::APP_NAME,
        content = content,
        nav = nav,
        script = script,
    )
}

/// Minimal HTML escaping for user-entered values.
fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ═══════════════════════════════════════════════════════════
// Dashboard
// ═══════════════════════════════════════════════════════════

pub fn render_home_page(medications: &[MedicationRecord]) -> String {
    let cards = if medications.is_empty() {
        r#"<div class="card empty">No medications yet. Scan a label to add your first prescription.</div>"#
            .to_string()
    } else {
        medications
            .iter()
            .map(|med| {
                let refill_badge = if med.refills == 0 {
                    r#"<span class="badge badge-warn">No Refills</span>"#.to_string()
                } else {
                    format!(r#"<span class="badge">{} refills left</span>"#, med.refills)
                };
                format!(
                    r#"<div class="card">
  <div class="card-row"><strong>{name}</strong>{refill_badge}</div>
  <p class="muted">{dosage} &middot; {frequency}</p>
  <div class="card-row"><span class="muted">{quantity} remaining</span><a class="btn btn-secondary" href="/shop">Refill</a></div>
</div>"#,
                    name = escape(&med.name),
                    refill_badge = refill_badge,
                    dosage = escape(&med.dosage),
                    frequency = escape(med.frequency.as_str()),
                    quantity = med.quantity,
                )
            })
            .collect::<String>()
    };

    let content = format!(
        r#"<h1>My Medications</h1>
<p class="subtitle">Manage your active prescriptions and refills.</p>
<a class="btn btn-primary btn-block" href="/scanner" style="margin-bottom:16px">+ Add New</a>
{cards}"#
    );
    render_shell("My Medications", "/", &content, "")
}

// ═══════════════════════════════════════════════════════════
// Scanner
// ═══════════════════════════════════════════════════════════

const SCANNER_SCRIPT: &str = r#"var nameInput=document.getElementById('med-name');
var confirmBtn=document.getElementById('confirm-btn');
var scanBtn=document.getElementById('scan-btn');
function refreshConfirm(){confirmBtn.disabled=nameInput.value.trim()==='';}
nameInput.addEventListener('input',refreshConfirm);
scanBtn.addEventListener('click',function(){
  var input=document.getElementById('label-photo');
  var errorBox=document.getElementById('scan-error');
  var busy=document.getElementById('scan-busy');
  errorBox.classList.add('hidden');
  if(!input.files||!input.files.length){
    errorBox.textContent='Choose a photo first.';
    errorBox.classList.remove('hidden');
    return;
  }
  var form=new FormData();
  form.append('image',input.files[0]);
  scanBtn.disabled=true;
  busy.classList.remove('hidden');
  function settle(){scanBtn.disabled=false;busy.classList.add('hidden');}
  fetch('/api/scan',{method:'POST',body:form})
    .then(function(res){return res.json().then(function(json){return {ok:res.ok,json:json};});})
    .then(function(out){
      settle();
      if(!out.ok){
        errorBox.textContent=(out.json.error&&out.json.error.message)||'Scan failed.';
        errorBox.classList.remove('hidden');
        return;
      }
      var c=out.json.candidate;
      nameInput.value=c.name;
      document.getElementById('med-dosage').value=c.dosage;
      document.getElementById('med-quantity').value=c.quantity;
      document.getElementById('med-frequency').value=c.frequency;
      refreshConfirm();
    })
    .catch(function(){
      settle();
      errorBox.textContent='Scan failed.';
      errorBox.classList.remove('hidden');
    });
});
confirmBtn.addEventListener('click',function(){
  var payload={
    name:nameInput.value,
    dosage:document.getElementById('med-dosage').value,
    quantity:parseInt(document.getElementById('med-quantity').value,10)||30,
    frequency:document.getElementById('med-frequency').value
  };
  fetch('/api/medications',{method:'POST',headers:{'Content-Type':'application/json'},body:JSON.stringify(payload)})
    .then(function(res){
      if(res.ok){window.location.href='/';return;}
      return res.json().then(function(json){
        var errorBox=document.getElementById('scan-error');
        errorBox.textContent=(json.error&&json.error.message)||'Could not save medication.';
        errorBox.classList.remove('hidden');
      });
    });
});"#;

pub fn render_scanner_page() -> String {
    let frequency_options = FREQUENCY_OPTIONS
        .iter()
        .map(|opt| format!(r#"<option value="{opt}">{opt}</option>"#))
        .collect::<String>();

    let content = format!(
        r#"<h1>Scan Prescription</h1>
<p class="subtitle">Upload a photo of your prescription bottle or label.</p>
<div class="card">
  <label class="field">Label photo<input type="file" id="label-photo" accept="image/*"></label>
  <button class="btn btn-primary btn-block" id="scan-btn">Scan Label</button>
  <p class="muted hidden" id="scan-busy">Scanning prescription...</p>
  <p class="error hidden" id="scan-error"></p>
</div>
<div class="card">
  <h2>Medication Details</h2>
  <label class="field">Name<input type="text" id="med-name" placeholder="e.g. Amoxicillin"></label>
  <label class="field">Dosage<input type="text" id="med-dosage" placeholder="e.g. 500mg"></label>
  <label class="field">Quantity<input type="number" id="med-quantity" value="30" min="1"></label>
  <label class="field">Frequency<select id="med-frequency">{frequency_options}</select></label>
  <button class="btn btn-primary btn-block" id="confirm-btn" disabled>Confirm &amp; Add Medication</button>
</div>"#
    );
    render_shell("Scan Prescription", "/scanner", &content, SCANNER_SCRIPT)
}

// ═══════════════════════════════════════════════════════════
// Shop
// ═══════════════════════════════════════════════════════════

const SHOP_SCRIPT: &str = r#"document.querySelectorAll('[data-add]').forEach(function(btn){
  btn.addEventListener('click',function(){
    fetch('/api/cart/items',{method:'POST',headers:{'Content-Type':'application/json'},body:JSON.stringify({medication_id:btn.getAttribute('data-add')})})
      .then(function(){window.location.reload();});
  });
});
document.querySelectorAll('[data-remove]').forEach(function(btn){
  btn.addEventListener('click',function(){
    fetch('/api/cart/items/'+btn.getAttribute('data-remove'),{method:'DELETE'})
      .then(function(){window.location.reload();});
  });
});
var checkoutBtn=document.getElementById('checkout-btn');
if(checkoutBtn){
  checkoutBtn.addEventListener('click',function(){
    checkoutBtn.disabled=true;
    checkoutBtn.textContent='Processing...';
    fetch('/api/cart/checkout',{method:'POST'})
      .then(function(res){return res.json().then(function(json){return {ok:res.ok,json:json};});})
      .then(function(out){
        if(out.ok){
          alert('Order placed successfully! (Mock)');
          window.location.reload();
          return;
        }
        alert((out.json.error&&out.json.error.message)||'Checkout failed.');
        checkoutBtn.disabled=false;
        checkoutBtn.textContent='Checkout';
      });
  });
}"#;

pub fn render_shop_page(medications: &[MedicationRecord], cart: &CartView) -> String {
    let catalog = if medications.is_empty() {
        r#"<div class="card empty">No prescriptions on file yet.</div>"#.to_string()
    } else {
        medications
            .iter()
            .map(|med| {
                format!(
                    r#"<div class="card">
  <div class="card-row"><strong>{name}</strong><span class="price">${price}</span></div>
  <p class="muted">{dosage}</p>
  <button class="btn btn-primary btn-block" data-add="{id}">Add to Cart</button>
</div>"#,
                    name = escape(&med.name),
                    price = format_cents(config::UNIT_PRICE_CENTS),
                    dosage = escape(&med.dosage),
                    id = med.id,
                )
            })
            .collect::<String>()
    };

    let summary = if cart.items.is_empty() {
        r#"<p class="muted">Your cart is empty</p>"#.to_string()
    } else {
        let rows = cart
            .items
            .iter()
            .map(|item| {
                format!(
                    r#"<div class="list-row">
  <div><strong>{name}</strong><span class="muted"> Qty: {qty}</span></div>
  <div><span class="price">${line_total}</span> <button class="btn-link" data-remove="{id}">Remove</button></div>
</div>"#,
                    name = escape(&item.name),
                    qty = item.cart_quantity,
                    line_total = format_cents(item.line_total_cents()),
                    id = item.medication_id,
                )
            })
            .collect::<String>();
        format!(
            r#"{rows}
<div class="list-row total-row"><strong>Total</strong><strong>${total}</strong></div>
<button class="btn btn-primary btn-block" id="checkout-btn">Checkout</button>"#,
            rows = rows,
            total = cart.total,
        )
    };

    let content = format!(
        r#"<h1>Pharmacy Shop</h1>
<p class="subtitle">Order refills and health essentials.</p>
<h2>Your Prescriptions</h2>
{catalog}
<div class="card">
  <h2>Order Summary</h2>
  {summary}
</div>"#
    );
    render_shell("Pharmacy Shop", "/shop", &content, SHOP_SCRIPT)
}

// ═══════════════════════════════════════════════════════════
// Reminders
// ═══════════════════════════════════════════════════════════

const REMINDERS_SCRIPT: &str = r#"document.querySelectorAll('[data-toggle]').forEach(function(btn){
  btn.addEventListener('click',function(){
    fetch('/api/schedule/'+btn.getAttribute('data-toggle')+'/toggle',{method:'POST'})
      .then(function(){window.location.reload();});
  });
});"#;

pub fn render_reminders_page(entries: &[ScheduleEntry]) -> String {
    let rows = if entries.is_empty() {
        r#"<div class="card empty">No reminders scheduled for today.</div>"#.to_string()
    } else {
        entries
            .iter()
            .map(|entry| {
                format!(
                    r#"<div class="card card-row{taken_class}">
  <div>
    <span class="time">{time}</span>
    <div><strong>{name}</strong></div>
    <p class="muted">{dosage} &middot; Take 1 pill</p>
  </div>
  <button class="btn {button_class}" data-toggle="{id}">{button_label}</button>
</div>"#,
                    taken_class = if entry.taken { " row-taken" } else { "" },
                    time = entry.slot.time_label(),
                    name = escape(&entry.name),
                    dosage = escape(&entry.dosage),
                    button_class = if entry.taken { "btn-secondary" } else { "btn-primary" },
                    id = entry.id,
                    button_label = if entry.taken { "Taken" } else { "Mark Taken" },
                )
            })
            .collect::<String>()
    };

    let content = format!(
        r#"<h1>Daily Reminders</h1>
<p class="subtitle">Track your medication intake for today.</p>
{rows}"#
    );
    render_shell("Daily Reminders", "/reminders", &content, REMINDERS_SCRIPT)
}

// ═══════════════════════════════════════════════════════════
// Fault page
// ═══════════════════════════════════════════════════════════

/// Standalone error page, deliberately independent of the shell so it
/// still renders when page construction itself is what failed.
pub fn render_fault_page(detail: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Something went wrong · {app_name}</title>
<style>
*,*::before,*::after{{box-sizing:border-box}}
body{{margin:0;font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:#fafaf9;color:#1c1917;display:flex;align-items:center;justify-content:center;min-height:100vh;padding:24px}}
.card{{background:#fff;border-radius:16px;box-shadow:0 4px 24px rgba(0,0,0,.08);max-width:420px;width:100%;padding:32px;text-align:center}}
h1{{font-size:1.25rem;margin:0 0 8px}}
p{{color:#78716c;font-size:.9rem;margin:0 0 20px}}
details{{text-align:left;margin-bottom:20px}}
summary{{font-size:.85rem;font-weight:600;cursor:pointer;color:#44403c}}
pre{{background:#f5f5f4;border-radius:8px;padding:12px;font-size:.75rem;white-space:pre-wrap;word-break:break-word;margin:8px 0 0}}
.btn{{display:block;width:100%;padding:14px;border:none;border-radius:10px;font-size:.95rem;font-weight:600;cursor:pointer;background:#2563eb;color:#fff}}
</style>
</head>
<body>
<div class="card">
  <h1>Something went wrong</h1>
  <p>We encountered an unexpected error. Please try refreshing the page.</p>
  <details>
    <summary>Error Details</summary>
    <pre>{detail}</pre>
  </details>
  <button class="btn" onclick="window.location.reload()">Refresh Page</button>
</div>
</body>
</html>"##,
        app_name = config::APP_NAME,
        detail = escape(detail),
    )
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
